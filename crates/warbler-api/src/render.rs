//! Minimal HTML pages. Every value that came from a user passes through
//! [`escape`] before it is written into markup.

use std::collections::HashSet;
use std::fmt::Write;

use warbler_db::{MessageRow, UserRow, UserStats};
use warbler_types::Flash;
use warbler_types::forms::SignupForm;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn layout(title: &str, user: Option<&UserRow>, flashes: &[Flash], body: &str) -> String {
    let nav = match user {
        Some(u) => format!(
            r#"<a href="/users/{id}">@{username}</a>
      <a href="/messages/new">New Message</a>
      <form method="POST" action="/logout"><button>Log out</button></form>"#,
            id = u.id,
            username = escape(&u.username),
        ),
        None => r#"<a href="/signup">Sign up</a>
      <a href="/login">Log in</a>"#
            .to_string(),
    };

    let mut notices = String::new();
    for flash in flashes {
        let _ = write!(
            notices,
            r#"<div class="alert alert-{}">{}</div>"#,
            flash.category.as_str(),
            escape(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>{title} | Warbler</title>
</head>
<body>
  <nav>
      <a href="/">Warbler</a>
      <form method="GET" action="/users"><input name="q" placeholder="Search Warbler"></form>
      {nav}
  </nav>
  <main>
    {notices}
    {body}
  </main>
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn not_found() -> String {
    layout("Not found", None, &[], "<h1>404</h1><p>Sorry, that page does not exist.</p>")
}

pub fn internal_error() -> String {
    layout("Error", None, &[], "<h1>500</h1><p>Something went wrong.</p>")
}

// -- Home --

pub fn home_anon() -> String {
    r#"<div class="home-hero">
  <h1>Happening?</h1>
  <h4>New to Warbler?</h4>
  <a href="/signup">Sign up now</a>
  <a href="/login">Log in</a>
</div>"#
        .to_string()
}

pub fn home(
    user: &UserRow,
    stats: &UserStats,
    timeline: &[MessageRow],
    liked: &HashSet<i64>,
) -> String {
    format!(
        r#"<aside class="user-card">
  <img src="{header}" alt="" class="header-image">
  <a href="/users/{id}"><img src="{image}" alt="Image for {username}"></a>
  <p>@{username}</p>
  {stats}
</aside>
<ul class="messages">{messages}</ul>"#,
        header = escape(&user.header_image_url),
        image = escape(&user.image_url),
        id = user.id,
        username = escape(&user.username),
        stats = stats_list(user.id, stats),
        messages = message_items(timeline, Some(user), liked),
    )
}

// -- Auth --

pub fn signup_form(error: Option<&str>, form: &SignupForm) -> String {
    format!(
        r#"<h2>Join Warbler today.</h2>
{error}
<form method="POST" action="/signup">
  <label>Username <input name="username" value="{username}"></label>
  <label>E-mail <input name="email" type="email" value="{email}"></label>
  <label>Password <input name="password" type="password"></label>
  <label>Image URL <input name="image_url" value="{image_url}"></label>
  <label>Header Image URL <input name="header_image_url" value="{header_image_url}"></label>
  <label>Bio <textarea name="bio">{bio}</textarea></label>
  <button>Sign me up!</button>
</form>"#,
        error = form_error(error),
        username = escape(&form.username),
        email = escape(&form.email),
        image_url = escape(form.image_url.as_deref().unwrap_or_default()),
        header_image_url = escape(form.header_image_url.as_deref().unwrap_or_default()),
        bio = escape(form.bio.as_deref().unwrap_or_default()),
    )
}

pub fn login_form(username: &str) -> String {
    format!(
        r#"<h2>Welcome back.</h2>
<form method="POST" action="/login">
  <label>Username <input name="username" value="{username}"></label>
  <label>Password <input name="password" type="password"></label>
  <button>Log in</button>
</form>"#,
        username = escape(username),
    )
}

// -- Users --

pub fn user_list(users: &[UserRow], search: Option<&str>) -> String {
    if users.is_empty() {
        return match search {
            Some(q) => format!("<h3>Sorry, no users found matching \"{}\"</h3>", escape(q)),
            None => "<h3>Sorry, no users found</h3>".to_string(),
        };
    }
    format!(r#"<ul class="users">{}</ul>"#, user_cards(users))
}

pub fn user_detail(
    user: &UserRow,
    stats: &UserStats,
    messages: &[MessageRow],
    viewer: Option<&UserRow>,
    viewer_follows: bool,
    liked: &HashSet<i64>,
) -> String {
    format!(
        r#"{header}
<ul class="messages">{messages}</ul>"#,
        header = profile_header(user, stats, viewer, viewer_follows),
        messages = message_items(messages, viewer, liked),
    )
}

pub fn user_connections(user: &UserRow, heading: &str, users: &[UserRow]) -> String {
    format!(
        r#"<h2>@{username} &middot; {heading}</h2>
<ul class="users">{cards}</ul>"#,
        username = escape(&user.username),
        heading = escape(heading),
        cards = user_cards(users),
    )
}

pub fn user_likes(
    user: &UserRow,
    messages: &[MessageRow],
    viewer: Option<&UserRow>,
    liked: &HashSet<i64>,
) -> String {
    format!(
        r#"<h2>@{username} &middot; Likes</h2>
<ul class="messages">{messages}</ul>"#,
        username = escape(&user.username),
        messages = message_items(messages, viewer, liked),
    )
}

pub fn profile_form(user: &UserRow, error: Option<&str>) -> String {
    format!(
        r#"<h2>Edit Your Profile.</h2>
{error}
<form method="POST" action="/users/profile">
  <label>Username <input name="username" value="{username}"></label>
  <label>E-mail <input name="email" type="email" value="{email}"></label>
  <label>Image URL <input name="image_url" value="{image_url}"></label>
  <label>Header Image URL <input name="header_image_url" value="{header_image_url}"></label>
  <label>Bio <textarea name="bio">{bio}</textarea></label>
  <label>Location <input name="location" value="{location}"></label>
  <label>Password <input name="password" type="password"></label>
  <button>Edit this user!</button>
</form>
<form method="POST" action="/users/delete"><button>Delete Profile</button></form>"#,
        error = form_error(error),
        username = escape(&user.username),
        email = escape(&user.email),
        image_url = escape(&user.image_url),
        header_image_url = escape(&user.header_image_url),
        bio = escape(user.bio.as_deref().unwrap_or_default()),
        location = escape(user.location.as_deref().unwrap_or_default()),
    )
}

// -- Messages --

pub fn message_form(error: Option<&str>, text: &str) -> String {
    format!(
        r#"{error}
<form method="POST" action="/messages/new">
  <textarea name="text" placeholder="What's happening?" maxlength="140">{text}</textarea>
  <button>Add my message!</button>
</form>"#,
        error = form_error(error),
        text = escape(text),
    )
}

pub fn message_detail(message: &MessageRow, viewer: Option<&UserRow>, liked: bool) -> String {
    let liked_ids: HashSet<i64> = if liked {
        HashSet::from([message.id])
    } else {
        HashSet::new()
    };
    format!(
        r#"<div class="message-detail">
<ul class="messages">{}</ul>
</div>"#,
        message_items(std::slice::from_ref(message), viewer, &liked_ids)
    )
}

// -- Fragments --

fn form_error(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<div class="alert alert-danger">{}</div>"#, escape(e)))
        .unwrap_or_default()
}

fn stats_list(user_id: i64, stats: &UserStats) -> String {
    format!(
        r#"<ul class="user-stats">
    <li><a href="/users/{user_id}">Messages {messages}</a></li>
    <li><a href="/users/{user_id}/following">Following {following}</a></li>
    <li><a href="/users/{user_id}/followers">Followers {followers}</a></li>
    <li><a href="/users/{user_id}/likes">Likes {likes}</a></li>
  </ul>"#,
        messages = stats.messages,
        following = stats.following,
        followers = stats.followers,
        likes = stats.likes,
    )
}

fn profile_header(
    user: &UserRow,
    stats: &UserStats,
    viewer: Option<&UserRow>,
    viewer_follows: bool,
) -> String {
    let action = match viewer {
        Some(v) if v.id == user.id => r#"<a href="/users/profile">Edit Profile</a>"#.to_string(),
        Some(_) if viewer_follows => format!(
            r#"<form method="POST" action="/users/stop-following/{}">
    <button>Unfollow</button>
  </form>"#,
            user.id
        ),
        Some(_) => format!(
            r#"<form method="POST" action="/users/follow/{}"><button>Follow</button></form>"#,
            user.id
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="profile">
  <img src="{header}" alt="" class="header-image">
  <img src="{image}" alt="Image for {username}">
  <h4>@{username}</h4>
  <p class="email">{email}</p>
  <p class="bio">{bio}</p>
  <p class="location">{location}</p>
  {stats}
  {action}
</div>"#,
        header = escape(&user.header_image_url),
        image = escape(&user.image_url),
        username = escape(&user.username),
        email = escape(&user.email),
        bio = escape(user.bio.as_deref().unwrap_or_default()),
        location = escape(user.location.as_deref().unwrap_or_default()),
        stats = stats_list(user.id, stats),
    )
}

fn user_cards(users: &[UserRow]) -> String {
    let mut out = String::new();
    for user in users {
        let _ = write!(
            out,
            r#"
  <li class="user-card">
    <a href="/users/{id}"><img src="{image}" alt="Image for {username}"> @{username}</a>
    <p>{bio}</p>
  </li>"#,
            id = user.id,
            image = escape(&user.image_url),
            username = escape(&user.username),
            bio = escape(user.bio.as_deref().unwrap_or_default()),
        );
    }
    out
}

fn message_items(
    messages: &[MessageRow],
    viewer: Option<&UserRow>,
    liked: &HashSet<i64>,
) -> String {
    let mut out = String::new();
    for msg in messages {
        let controls = match viewer {
            Some(v) if v.id == msg.user_id => format!(
                r#"<form method="POST" action="/messages/{}/delete">
      <button>Delete</button>
    </form>"#,
                msg.id
            ),
            Some(_) => format!(
                r#"<form method="POST" action="/users/toggle_like/{}"><button>{}</button></form>"#,
                msg.id,
                if liked.contains(&msg.id) { "Unlike" } else { "Like" }
            ),
            None => String::new(),
        };

        let _ = write!(
            out,
            r#"
  <li class="message">
    <a href="/users/{user_id}"><img src="{image}" alt=""> @{username}</a>
    <span class="timestamp">{timestamp}</span>
    <p><a href="/messages/{id}">{text}</a></p>
    {controls}
  </li>"#,
            user_id = msg.user_id,
            image = escape(&msg.author_image_url),
            username = escape(&msg.author_username),
            timestamp = msg.timestamp.format("%d %B %Y"),
            id = msg.id,
            text = escape(&msg.text),
        );
    }
    out
}
