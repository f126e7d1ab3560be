//! Mutating Actions, account actions and checkout payments.
//!
//! Each action sends one write through the gateway and, only when it
//! succeeds, invalidates exactly the tags whose resources it changed.

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::endpoints::{ResourceId, admin, auth, cart, categories, orders, products};
use crate::domain::normalized_response::{INVALID_JSON, PAYMENT_PROVIDER_ERROR};
use crate::domain::ports::{PaymentIntent, PaymentIntentRequest, PaymentProviderError};
use crate::domain::storefront::endpoint_failure;
use crate::domain::{
    AddToCart, CacheTag, DiscountCode, GatewayRequest, HttpMethod, LoginCredentials, LoginGrant,
    MultipartPayload, NormalizedResponse, OrderStatus, PaymentIntentInput, Quantity, Registration,
    ResourcePayload, Session, Storefront, tags,
};

const CART_LINE_TAGS: &[CacheTag] = &[tags::GET_CART, tags::GET_CART_COUNT];
const CART_TAGS: &[CacheTag] = &[tags::GET_CART];
const PLACE_ORDER_TAGS: &[CacheTag] = &[
    tags::GET_CART,
    tags::GET_CART_COUNT,
    tags::GET_ORDERS,
    tags::GET_ADMIN_ORDERS,
];
const ORDER_TAGS: &[CacheTag] = &[tags::GET_ORDERS, tags::GET_ORDER, tags::GET_ADMIN_ORDERS];
const PRODUCT_TAGS: &[CacheTag] = &[tags::GET_PRODUCTS, tags::GET_PRODUCT];
const CATEGORY_TAGS: &[CacheTag] = &[tags::GET_CATEGORIES, tags::GET_PRODUCTS];
const PROFILE_TAGS: &[CacheTag] = &[tags::GET_PROFILE];

impl Storefront {
    /// Add a product to the cart.
    pub async fn add_to_cart(
        &self,
        session: &Session,
        command: &AddToCart,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(HttpMethod::Post, self.catalog.url(cart::ADD_ITEM), session)
            .map(|request| request.json(command.to_body()));
        self.mutate(request, CART_LINE_TAGS).await
    }

    /// Change the quantity of a cart line.
    pub async fn update_cart_item(
        &self,
        session: &Session,
        item_id: &ResourceId,
        quantity: Quantity,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(
                HttpMethod::Patch,
                self.catalog.url_for(cart::UPDATE_ITEM, item_id),
                session,
            )
            .map(|request| request.json(serde_json::json!({ "quantity": quantity.get() })));
        self.mutate(request, CART_LINE_TAGS).await
    }

    /// Remove a cart line.
    pub async fn remove_cart_item(
        &self,
        session: &Session,
        item_id: &ResourceId,
    ) -> NormalizedResponse<Value> {
        let request = self.write_request(
            HttpMethod::Delete,
            self.catalog.url_for(cart::REMOVE_ITEM, item_id),
            session,
        );
        self.mutate(request, CART_LINE_TAGS).await
    }

    /// Apply a discount code to the cart.
    pub async fn apply_discount(
        &self,
        session: &Session,
        code: &DiscountCode,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(
                HttpMethod::Post,
                self.catalog.url(cart::APPLY_DISCOUNT),
                session,
            )
            .map(|request| request.json(code.to_body()));
        self.mutate(request, CART_TAGS).await
    }

    /// Remove the cart's discount.
    pub async fn remove_discount(&self, session: &Session) -> NormalizedResponse<Value> {
        let request = self.write_request(
            HttpMethod::Delete,
            self.catalog.url(cart::REMOVE_DISCOUNT),
            session,
        );
        self.mutate(request, CART_TAGS).await
    }

    /// Turn the cart into an order.
    pub async fn place_order(
        &self,
        session: &Session,
        checkout: ResourcePayload,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(HttpMethod::Post, self.catalog.url(orders::PLACE), session)
            .map(|request| request.json(checkout.into_body()));
        self.mutate(request, PLACE_ORDER_TAGS).await
    }

    /// Cancel one of the current user's orders.
    pub async fn cancel_order(
        &self,
        session: &Session,
        order_id: &ResourceId,
    ) -> NormalizedResponse<Value> {
        let request = self.write_request(
            HttpMethod::Post,
            self.catalog.url_for(orders::CANCEL, order_id),
            session,
        );
        self.mutate(request, ORDER_TAGS).await
    }

    /// Move an order to a new lifecycle state.
    pub async fn admin_update_order_status(
        &self,
        session: &Session,
        order_id: &ResourceId,
        status: OrderStatus,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(
                HttpMethod::Patch,
                self.catalog.url_for(admin::ORDER_STATUS, order_id),
                session,
            )
            .map(|request| request.json(status.to_body()));
        self.mutate(request, ORDER_TAGS).await
    }

    /// Create a product.
    pub async fn create_product(
        &self,
        session: &Session,
        product: ResourcePayload,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(HttpMethod::Post, self.catalog.url(products::CREATE), session)
            .map(|request| request.json(product.into_body()));
        self.mutate(request, PRODUCT_TAGS).await
    }

    /// Update a product.
    pub async fn update_product(
        &self,
        session: &Session,
        product_id: &ResourceId,
        changes: ResourcePayload,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(
                HttpMethod::Patch,
                self.catalog.url_for(products::UPDATE, product_id),
                session,
            )
            .map(|request| request.json(changes.into_body()));
        self.mutate(request, PRODUCT_TAGS).await
    }

    /// Delete a product.
    pub async fn delete_product(
        &self,
        session: &Session,
        product_id: &ResourceId,
    ) -> NormalizedResponse<Value> {
        let request = self.write_request(
            HttpMethod::Delete,
            self.catalog.url_for(products::DELETE, product_id),
            session,
        );
        self.mutate(request, PRODUCT_TAGS).await
    }

    /// Upload a product image; the multipart form is passed through as-is.
    pub async fn upload_product_image(
        &self,
        session: &Session,
        product_id: &ResourceId,
        form: MultipartPayload,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(
                HttpMethod::Post,
                self.catalog.url_for(products::UPLOAD_IMAGE, product_id),
                session,
            )
            .map(|request| request.multipart(form));
        self.mutate(request, PRODUCT_TAGS).await
    }

    /// Create a category.
    pub async fn create_category(
        &self,
        session: &Session,
        category: ResourcePayload,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(
                HttpMethod::Post,
                self.catalog.url(categories::CREATE),
                session,
            )
            .map(|request| request.json(category.into_body()));
        self.mutate(request, CATEGORY_TAGS).await
    }

    /// Update a category.
    pub async fn update_category(
        &self,
        session: &Session,
        category_id: &ResourceId,
        changes: ResourcePayload,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(
                HttpMethod::Patch,
                self.catalog.url_for(categories::UPDATE, category_id),
                session,
            )
            .map(|request| request.json(changes.into_body()));
        self.mutate(request, CATEGORY_TAGS).await
    }

    /// Delete a category.
    pub async fn delete_category(
        &self,
        session: &Session,
        category_id: &ResourceId,
    ) -> NormalizedResponse<Value> {
        let request = self.write_request(
            HttpMethod::Delete,
            self.catalog.url_for(categories::DELETE, category_id),
            session,
        );
        self.mutate(request, CATEGORY_TAGS).await
    }

    /// Update the current user's profile.
    pub async fn update_profile(
        &self,
        session: &Session,
        changes: ResourcePayload,
    ) -> NormalizedResponse<Value> {
        let request = self
            .write_request(HttpMethod::Patch, self.catalog.url(auth::PROFILE), session)
            .map(|request| request.json(changes.into_body()));
        self.mutate(request, PROFILE_TAGS).await
    }

    /// Exchange credentials for a session.
    ///
    /// The call is sent without a credential. On success the backend body is
    /// turned into the [`Session`] the caller must persist; a body without a
    /// usable token or identity becomes an [`INVALID_JSON`] failure.
    pub async fn login(&self, credentials: &LoginCredentials) -> NormalizedResponse<Session> {
        let url = match self.catalog.url(auth::LOGIN) {
            Ok(url) => url,
            Err(error) => return endpoint_failure(&error),
        };
        let request = GatewayRequest::new(HttpMethod::Post, url)
            .json(credentials.to_body())
            .without_auth();
        let response = self.gateway.send(request).await;
        if !response.is_success() {
            info!(status = response.status_code(), "login rejected by backend");
            return response.discard_data();
        }

        let status = response.status_code();
        let grant = response.decode::<LoginGrant>();
        let Some(grant) = grant.into_data() else {
            return malformed_login(status, "login response lacks a credential or user");
        };
        match grant.into_session() {
            Ok(session) => NormalizedResponse::success(status, session),
            Err(error) => malformed_login(status, &error.to_string()),
        }
    }

    /// Create an account. The backend decides whether the user is logged in
    /// afterwards; no session is written here.
    pub async fn register(&self, registration: &Registration) -> NormalizedResponse<Value> {
        let url = match self.catalog.url(auth::REGISTER) {
            Ok(url) => url,
            Err(error) => return endpoint_failure(&error),
        };
        let request = GatewayRequest::new(HttpMethod::Post, url)
            .json(registration.to_body())
            .without_auth();
        self.gateway.send(request).await
    }

    /// Tell the backend the credential is being discarded.
    ///
    /// Best effort: failures are logged and returned, and the caller clears
    /// the local session regardless.
    pub async fn logout(&self, session: &Session) -> NormalizedResponse<Value> {
        let request = self.write_request(HttpMethod::Post, self.catalog.url(auth::LOGOUT), session);
        let request = match request {
            Ok(request) => request,
            Err(error) => return endpoint_failure(&error),
        };
        let response = self.gateway.send(request).await;
        if !response.is_success() {
            warn!(
                status = response.status_code(),
                "backend logout failed; local session is cleared anyway"
            );
        }
        response
    }

    /// Create a checkout payment intent with the payment provider.
    pub async fn create_payment_intent(
        &self,
        session: &Session,
        input: &PaymentIntentInput,
    ) -> NormalizedResponse<PaymentIntent> {
        let Some(provider) = self.payments.as_ref() else {
            return NormalizedResponse::failure(
                503,
                "Payments are not configured",
                Some(PAYMENT_PROVIDER_ERROR.to_owned()),
                None,
            );
        };

        let mut metadata = input.metadata().clone();
        if let Some(principal) = session.principal() {
            metadata.insert("userId".to_owned(), principal.user_id.to_string());
        }
        let request = PaymentIntentRequest {
            amount: input.amount(),
            currency: input.currency().to_owned(),
            metadata,
        };

        match provider.create_intent(&request).await {
            Ok(intent) => {
                info!(
                    intent_id = %intent.id,
                    amount = request.amount,
                    currency = %request.currency,
                    "payment intent created"
                );
                NormalizedResponse::success(200, intent)
            }
            Err(error) => {
                warn!(%error, "payment intent creation failed");
                let status = match &error {
                    PaymentProviderError::Rejected { status, .. } if (400..500).contains(status) => {
                        *status
                    }
                    _ => 502,
                };
                NormalizedResponse::failure(
                    status,
                    "Payment could not be initialised",
                    Some(PAYMENT_PROVIDER_ERROR.to_owned()),
                    Some(error.to_string()),
                )
            }
        }
    }
}

fn malformed_login(status: u16, details: &str) -> NormalizedResponse<Session> {
    warn!(status, "backend login response could not be turned into a session");
    NormalizedResponse::failure(
        502,
        "Backend login response was not understood",
        Some(INVALID_JSON.to_owned()),
        Some(format!("status {status}: {details}")),
    )
}
