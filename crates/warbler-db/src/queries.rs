use anyhow::{Result, anyhow, bail};
use rusqlite::{Connection, Row, params};
use tracing::info;
use warbler_types::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

use crate::models::{MessageRow, NewMessage, NewUser, ProfileUpdate, UserRow};
use crate::{Database, password};

pub(crate) const USER_COLUMNS: &str =
    "u.id, u.username, u.email, u.password, u.image_url, u.header_image_url, u.bio, u.location";

pub(crate) const MESSAGE_SELECT: &str =
    "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
     FROM messages m
     JOIN users u ON m.user_id = u.id";

impl Database {
    // -- Users --

    /// Hash the password and store a new user. Empty or duplicate usernames and
    /// emails fail with a constraint violation.
    pub fn signup(&self, new: &NewUser) -> Result<UserRow> {
        if new.password.is_empty() {
            bail!("password is required");
        }
        let password_hash = password::hash(&new.password)?;

        let user = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, image_url, header_image_url, bio)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.username,
                    new.email,
                    password_hash,
                    or_default(new.image_url.as_deref(), DEFAULT_IMAGE_URL),
                    or_default(new.header_image_url.as_deref(), DEFAULT_HEADER_IMAGE_URL),
                    new.bio,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?
                .ok_or_else(|| anyhow!("User {} missing after insert", id))
        })?;

        info!("New user {}", user);
        Ok(user)
    }

    /// `Ok(None)` for an unknown username or a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRow>> {
        let Some(user) = self.get_user_by_username(username)? else {
            return Ok(None);
        };
        Ok(password::verify(password, &user.password).then_some(user))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
            conn.query_row(&sql, [username], user_from_row).optional()
        })
    }

    /// All users, or those whose username contains `search` (case-insensitive).
    pub fn list_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE ?1 IS NULL OR instr(lower(u.username), lower(?1)) > 0
                 ORDER BY u.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([search], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite the editable profile fields. The password is not touched.
    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<UserRow> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users
                 SET username = ?2, email = ?3, image_url = ?4, header_image_url = ?5,
                     bio = ?6, location = ?7
                 WHERE id = ?1",
                params![
                    id,
                    update.username,
                    update.email,
                    or_default(update.image_url.as_deref(), DEFAULT_IMAGE_URL),
                    or_default(update.header_image_url.as_deref(), DEFAULT_HEADER_IMAGE_URL),
                    update.bio,
                    update.location,
                ],
            )?;
            if changed == 0 {
                bail!("User not found: {}", id);
            }
            query_user_by_id(conn, id)?
                .ok_or_else(|| anyhow!("User not found: {}", id))
        })
    }

    /// Removes the user along with their messages, follows and likes.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let deleted = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?)
        })?;
        if deleted > 0 {
            info!("Deleted user #{}", id);
        }
        Ok(deleted > 0)
    }

    // -- Messages --

    /// Store a message. Fails with a constraint violation when the author does
    /// not exist or the text is empty or longer than 140 characters.
    pub fn insert_message(&self, new: &NewMessage) -> Result<MessageRow> {
        self.with_conn(|conn| {
            match new.timestamp {
                Some(ts) => conn.execute(
                    "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
                    params![new.text, ts, new.user_id],
                )?,
                None => conn.execute(
                    "INSERT INTO messages (text, user_id) VALUES (?1, ?2)",
                    params![new.text, new.user_id],
                )?,
            };
            let id = conn.last_insert_rowid();
            query_message(conn, id)?
                .ok_or_else(|| anyhow!("Message {} missing after insert", id))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// Messages authored by `user_id`, newest first.
    pub fn messages(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE m.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            query_messages(conn, &sql, params![user_id, limit])
        })
    }

    /// Home feed: messages by the user and by everyone they follow, newest first.
    pub fn timeline(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE m.user_id = ?1
                    OR m.user_id IN (
                        SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                    )
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            query_messages(conn, &sql, params![user_id, limit])
        })
    }
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        image_url: row.get(4)?,
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
    })
}

pub(crate) fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        author_image_url: row.get(5)?,
    })
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    conn.query_row(&sql, [id], user_from_row).optional()
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
    conn.query_row(&sql, [id], message_from_row).optional()
}

pub(crate) fn query_messages<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
