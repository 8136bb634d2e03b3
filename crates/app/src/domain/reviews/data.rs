//! Review Data

use crate::domain::{
    products::records::ProductUuid,
    reviews::records::{Rating, ReviewUuid},
};

/// New Review Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub uuid: ReviewUuid,
    pub product_uuid: ProductUuid,
    pub rating: Rating,
    pub body: String,
}
