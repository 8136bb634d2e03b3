//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use bazaar::{discounts::DiscountPercent, quantity::Quantity, totals::TotalsSummary};
use bazaar_app::{
    auth::{AuthenticatedUser, MockAuthService, Role, SessionUuid, UserUuid},
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid},
        },
        orders::MockOrdersService,
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
        reviews::MockReviewsService,
    },
};

use crate::state::State;

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());
pub(crate) const TEST_SESSION_UUID: SessionUuid = SessionUuid::from_uuid(Uuid::nil());

pub(crate) fn customer() -> AuthenticatedUser {
    AuthenticatedUser {
        user_uuid: TEST_USER_UUID,
        session_uuid: TEST_SESSION_UUID,
        role: Role::Customer,
    }
}

pub(crate) fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        role: Role::Admin,
        ..customer()
    }
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_register().never();
    auth.expect_login().never();
    auth.expect_refresh().never();
    auth.expect_logout().never();
    auth.expect_authenticate_bearer().never();
    auth.expect_get_user().never();

    auth
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_delete_product().never();

    products
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_add_item().never();
    carts.expect_merge_items().never();
    carts.expect_update_item().never();
    carts.expect_remove_item().never();
    carts.expect_clear_cart().never();

    carts
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_place_order().never();
    orders.expect_list_orders().never();
    orders.expect_get_order().never();
    orders.expect_cancel_order().never();

    orders
}

fn strict_reviews_mock() -> MockReviewsService {
    let mut reviews = MockReviewsService::new();

    reviews.expect_create_review().never();
    reviews.expect_list_reviews().never();

    reviews
}

/// Service mocks backing a test server. Anything not replaced rejects every call.
pub(crate) struct TestServices {
    pub auth: MockAuthService,
    pub products: MockProductsService,
    pub carts: MockCartsService,
    pub orders: MockOrdersService,
    pub reviews: MockReviewsService,
}

impl Default for TestServices {
    fn default() -> Self {
        Self {
            auth: strict_auth_mock(),
            products: strict_products_mock(),
            carts: strict_carts_mock(),
            orders: strict_orders_mock(),
            reviews: strict_reviews_mock(),
        }
    }
}

pub(crate) fn state_with(services: TestServices) -> Arc<State> {
    State::from_app_context(AppContext {
        auth: Arc::new(services.auth),
        products: Arc::new(services.products),
        carts: Arc::new(services.carts),
        orders: Arc::new(services.orders),
        reviews: Arc::new(services.reviews),
    })
}

/// Serve `route` as if the auth middleware had already resolved `user`.
pub(crate) fn service_as(user: AuthenticatedUser, services: TestServices, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with(services)))
            .hoop(inject(user))
            .push(route),
    )
}

/// Serve `route` without an authenticated user.
pub(crate) fn anonymous_service(services: TestServices, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state_with(services))).push(route))
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    service_as(
        admin(),
        TestServices {
            products,
            ..TestServices::default()
        },
        route,
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    service_as(
        customer(),
        TestServices {
            carts,
            ..TestServices::default()
        },
        route,
    )
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    service_as(
        customer(),
        TestServices {
            orders,
            ..TestServices::default()
        },
        route,
    )
}

pub(crate) fn reviews_service(reviews: MockReviewsService, route: Router) -> Service {
    service_as(
        customer(),
        TestServices {
            reviews,
            ..TestServices::default()
        },
        route,
    )
}

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Teapot".to_string(),
        description: "Short and stout".to_string(),
        price: 1_250,
        discount: DiscountPercent::NONE,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

pub(crate) fn make_cart_item(
    uuid: CartItemUuid,
    product: ProductUuid,
    quantity: Quantity,
) -> CartItemRecord {
    CartItemRecord {
        uuid,
        product_uuid: product,
        name: "Teapot".to_string(),
        unit_price: 1_250,
        discount: DiscountPercent::NONE,
        quantity,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_cart(items: Vec<CartItemRecord>) -> CartRecord {
    let gross = items
        .iter()
        .map(|item| item.unit_price * u64::from(item.quantity.get()))
        .sum::<u64>();

    let totals = TotalsSummary {
        currency: "GBP",
        gross: i64::try_from(gross).unwrap_or(i64::MAX),
        net: i64::try_from(gross).unwrap_or(i64::MAX),
        line_count: items.len(),
        unit_count: items.iter().map(|item| u64::from(item.quantity.get())).sum(),
    };

    CartRecord {
        uuid: CartUuid::from_uuid(Uuid::nil()),
        user_uuid: TEST_USER_UUID,
        items,
        totals,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
