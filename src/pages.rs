//! Minimal HTML rendering for the login, registration and dashboard pages.
//!
//! Plumbing only; the auth subsystem treats this as an external collaborator
//! that re-renders forms on recoverable failures.

use axum::response::Html;

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title} - Greenroom</title><link rel="stylesheet" href="/assets/app.css"></head>
<body>
{body}
</body>
</html>"#,
    ))
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(message) => format!(r#"<p class="error">{}</p>"#, escape(message)),
        None => String::new(),
    }
}

pub fn login_page(error: Option<&str>, to: Option<&str>, email: Option<&str>) -> Html<String> {
    let to_field = match to {
        Some(target) => format!(
            r#"<input type="hidden" name="to" value="{}">"#,
            escape(target)
        ),
        None => String::new(),
    };
    let body = format!(
        r#"<h1>Log in</h1>
{banner}
<form method="post" action="/login">
  <label>Email <input type="email" name="email" value="{email}" required></label>
  <label>Password <input type="password" name="password" required></label>
  {to_field}
  <button type="submit">Log in</button>
</form>
<p><a href="/auth/login">Log in with your identity provider</a></p>
<p>No account yet? <a href="/register">Register</a></p>"#,
        banner = error_banner(error),
        email = escape(email.unwrap_or("")),
    );
    layout("Log in", &body)
}

pub fn register_page(error: Option<&str>, username: Option<&str>, email: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Register</h1>
{banner}
<form method="post" action="/register">
  <label>Name <input type="text" name="username" value="{username}" required></label>
  <label>Email <input type="email" name="email" value="{email}" required></label>
  <label>Password <input type="password" name="password" required></label>
  <label>Confirm password <input type="password" name="password-confirmation" required></label>
  <button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        banner = error_banner(error),
        username = escape(username.unwrap_or("")),
        email = escape(email.unwrap_or("")),
    );
    layout("Register", &body)
}

pub fn dashboard_page(email: &str) -> Html<String> {
    let body = format!(
        r#"<h1>Dashboard</h1>
<p>Signed in as {}</p>
<form method="post" action="/logout"><button type="submit">Log out</button></form>"#,
        escape(email),
    );
    layout("Dashboard", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_renders_error_and_prefill() {
        let page = login_page(Some("The passwords do not match"), Some("/dashboard"), Some("a@b.c"));
        assert!(page.0.contains("The passwords do not match"));
        assert!(page.0.contains(r#"name="to" value="/dashboard""#));
        assert!(page.0.contains(r#"value="a@b.c""#));
    }

    #[test]
    fn test_values_are_escaped() {
        let page = login_page(None, None, Some(r#""><script>"#));
        assert!(!page.0.contains("<script>"));
    }
}
