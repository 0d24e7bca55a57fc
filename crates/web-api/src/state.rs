use std::sync::Arc;

use application::{AccountService, BlogService};
use config::Settings;

use crate::auth::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub blog_service: Arc<BlogService>,
    pub account_service: Arc<AccountService>,
    pub token_service: Arc<TokenService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        blog_service: Arc<BlogService>,
        account_service: Arc<AccountService>,
        token_service: Arc<TokenService>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            blog_service,
            account_service,
            token_service,
            settings,
        }
    }
}
