//! Cookie descriptors. The HTTP layer turns these into `Set-Cookie` headers.

use chrono::Duration;

use crate::models::SESSION_TTL_DAYS;
use crate::services::jwt::ACCESS_TOKEN_TTL_MINUTES;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieAttributes {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSitePolicy,
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDescriptor {
    pub name: &'static str,
    pub value: String,
    pub attributes: CookieAttributes,
    pub max_age: Duration,
}

impl CookieDescriptor {
    pub fn is_clearing(&self) -> bool {
        self.value.is_empty() && self.max_age.is_zero()
    }
}

/// Builds descriptors with the deployment's attributes. `Secure` is on in
/// production only.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn attributes(&self) -> CookieAttributes {
        CookieAttributes {
            http_only: true,
            secure: self.secure,
            same_site: SameSitePolicy::Strict,
            path: "/",
        }
    }

    pub fn access_token(&self, token: String) -> CookieDescriptor {
        CookieDescriptor {
            name: ACCESS_TOKEN_COOKIE,
            value: token,
            attributes: self.attributes(),
            max_age: Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        }
    }

    pub fn refresh_token(&self, token: String) -> CookieDescriptor {
        CookieDescriptor {
            name: REFRESH_TOKEN_COOKIE,
            value: token,
            attributes: self.attributes(),
            max_age: Duration::days(SESSION_TTL_DAYS),
        }
    }

    pub fn clear(&self, name: &'static str) -> CookieDescriptor {
        CookieDescriptor {
            name,
            value: String::new(),
            attributes: self.attributes(),
            max_age: Duration::zero(),
        }
    }

    pub fn clear_both(&self) -> Vec<CookieDescriptor> {
        vec![
            self.clear(ACCESS_TOKEN_COOKIE),
            self.clear(REFRESH_TOKEN_COOKIE),
        ]
    }
}
