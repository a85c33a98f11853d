//! Server-rendered HTML pages. Every piece of user data goes through [`escape`].

use std::fmt::Write;

use time::{macros::format_description, UtcOffset};

use crate::{flash::Flash, users::repo_types::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let alert = flash
        .map(|f| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<main>
{alert}
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn user_list(users: &[User], flash: Option<&Flash>) -> String {
    let mut body = String::from(
        r#"<h1>Users</h1>
<p><a href="/users/new">New user</a></p>
"#,
    );

    if users.is_empty() {
        body.push_str("<p>No users yet.</p>\n");
        return layout("Users", flash, &body);
    }

    body.push_str(
        "<table>\n<thead><tr><th>Name</th><th>Email</th><th>Joined</th><th></th></tr></thead>\n<tbody>\n",
    );
    for user in users {
        let joined = user
            .joined_on
            .to_offset(UtcOffset::UTC)
            .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
            .unwrap_or_default();
        // writing into a String cannot fail
        let _ = write!(
            body,
            r#"<tr><td>{name}</td><td>{email}</td><td>{joined}</td><td><a href="/users/{id}/edit">Edit</a> <form method="post" action="/users/{id}/delete" style="display:inline"><button type="submit">Delete</button></form></td></tr>
"#,
            id = user.id,
            name = escape(&user.name),
            email = escape(&user.email),
        );
    }
    body.push_str("</tbody>\n</table>\n");

    layout("Users", flash, &body)
}

pub fn user_form(mode: FormMode, user: Option<&User>, flash: Option<&Flash>) -> String {
    let (title, action, password_label) = match (mode, user) {
        (FormMode::Edit, Some(u)) => (
            "Edit user",
            format!("/users/{}/edit", u.id),
            "Password (leave blank to keep)",
        ),
        _ => ("New user", "/users/new".to_string(), "Password"),
    };
    let name = user.map(|u| escape(&u.name)).unwrap_or_default();
    let email = user.map(|u| escape(&u.email)).unwrap_or_default();
    let required = if mode == FormMode::Create { " required" } else { "" };

    let body = format!(
        r#"<h1>{title}</h1>
<form method="post" action="{action}">
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>{password_label} <input type="password" name="password" value=""{required}></label>
<button type="submit">Save</button>
</form>
<p><a href="/users">Back to list</a></p>
"#
    );
    layout(title, flash, &body)
}

pub fn not_found() -> String {
    layout(
        "Not Found",
        None,
        "<h1>Not Found</h1>\n<p>The requested user does not exist.</p>\n<p><a href=\"/users\">Back to list</a></p>\n",
    )
}
