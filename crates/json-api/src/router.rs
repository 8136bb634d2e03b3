//! App Router

use salvo::Router;

use crate::{auth, carts, healthcheck, observability, orders, products, reviews};

/// Every API route. Method filters let a path appear in both the public and the authenticated
/// branch.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(public_router())
        .push(authenticated_router())
}

fn public_router() -> Router {
    Router::new()
        .push(
            Router::with_path("auth")
                .push(Router::with_path("register").post(auth::register::handler))
                .push(Router::with_path("login").post(auth::login::handler))
                .push(Router::with_path("refresh").post(auth::refresh::handler)),
        )
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(
                    Router::with_path("{product}")
                        .get(products::get::handler)
                        .push(Router::with_path("reviews").get(reviews::index::handler)),
                ),
        )
}

fn authenticated_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(Router::with_path("auth/logout").post(auth::logout::handler))
        .push(
            Router::with_path("products")
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .put(products::update::handler)
                        .delete(products::delete::handler)
                        .push(Router::with_path("reviews").post(reviews::create::handler)),
                ),
        )
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .post(carts::items::create::handler)
                .delete(carts::clear::handler)
                .push(Router::with_path("merge").post(carts::merge::handler))
                .push(
                    Router::with_path("{item}")
                        .patch(carts::items::update::handler)
                        .delete(carts::items::delete::handler),
                ),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::create::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("cancel").post(orders::cancel::handler)),
                ),
        )
}
