use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::services::cookies::{CookieDescriptor, SameSitePolicy};

fn to_cookie(descriptor: CookieDescriptor) -> Cookie<'static> {
    let attrs = descriptor.attributes;
    let same_site = match attrs.same_site {
        SameSitePolicy::Strict => SameSite::Strict,
    };

    Cookie::build((descriptor.name, descriptor.value))
        .path(attrs.path)
        .http_only(attrs.http_only)
        .secure(attrs.secure)
        .same_site(same_site)
        .max_age(time::Duration::seconds(descriptor.max_age.num_seconds()))
        .build()
}

/// Add each descriptor to the jar as a `Set-Cookie`.
pub fn apply_cookies(jar: CookieJar, descriptors: Vec<CookieDescriptor>) -> CookieJar {
    descriptors
        .into_iter()
        .fold(jar, |jar, descriptor| jar.add(to_cookie(descriptor)))
}
