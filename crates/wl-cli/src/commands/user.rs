//! User registration and listing.

use std::io::Write;

use anyhow::{Context, Result, bail};

use wl_core::{Store, User, UserId};
use wl_db::Database;

use super::util::id_label;

pub fn add<W: Write>(writer: &mut W, db: &Database, name: &str) -> Result<User> {
    let name = UserId::new(name.trim()).context("invalid user name")?;
    if db.find_user(&name)?.is_some() {
        bail!("user already exists: {name}");
    }
    let user = db.save(User::new(name))?;
    writeln!(writer, "Added user {} (#{})", user.name(), id_label(user.id()))?;
    Ok(user)
}

pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let users: Vec<User> = db.store_all()?;
    if users.is_empty() {
        writeln!(writer, "No users registered.")?;
        return Ok(());
    }
    for user in users {
        writeln!(writer, "#{}  {}", id_label(user.id()), user.name())?;
    }
    Ok(())
}
