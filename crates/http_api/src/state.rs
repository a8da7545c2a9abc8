use app_api::AppContext;

#[derive(Clone)]
pub struct HttpState {
    pub context: AppContext,
    /// Enables the operator routes when set.
    pub admin_token: Option<String>,
}

impl HttpState {
    pub fn new(context: AppContext, admin_token: Option<String>) -> Self {
        Self {
            context,
            admin_token: admin_token.filter(|token| !token.trim().is_empty()),
        }
    }
}
