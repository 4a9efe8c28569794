use std::sync::Arc;

use crate::services::profile::ProfileService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub jwt_secret: Arc<str>,
    pub max_picture_bytes: usize,
}

impl AppState {
    pub fn new(profiles: ProfileService, jwt_secret: &str, max_picture_bytes: usize) -> Self {
        Self {
            profiles: Arc::new(profiles),
            jwt_secret: Arc::from(jwt_secret),
            max_picture_bytes,
        }
    }
}
