//! Profile store contract and SQLite implementation.
//!
//! # Invariants
//! - `profiles.slug` uniqueness is enforced by a UNIQUE index, not by callers.
//! - Link batches are written in one transaction each.
//! - Read paths reject invalid persisted state instead of masking it, except
//!   for theme/layout blobs which decode to named defaults.

use crate::db::DbError;
use crate::model::profile::{CardDetails, CardId, OwnerId, Profile, ProfileId, SlugOwner};
use crate::model::social_link::{LinkId, NewSocialLink, SocialLink};
use crate::model::theme::{Layout, Theme};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PROFILE_SELECT_SQL: &str = "SELECT
    uuid,
    owner_uuid,
    slug,
    global_handle,
    title,
    company,
    position,
    bio,
    phone,
    whatsapp,
    email,
    website,
    address,
    map_link,
    avatar_url,
    theme,
    layout,
    shape,
    is_published
FROM profiles";

const LINK_SELECT_SQL: &str = "SELECT
    uuid,
    profile_uuid,
    platform,
    handle,
    url,
    is_auto_synced,
    is_active,
    display_order
FROM social_links";

pub type StoreResult<T> = Result<T, StoreError>;

/// Profile store error, propagated to callers unmodified.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Storage-level uniqueness violation on the profile slug.
    SlugTaken(String),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SlugTaken(slug) => write!(f, "slug already taken: {slug}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SlugTaken(_) => None,
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage capabilities consumed by slug allocation, auto-sync and the save flow.
pub trait ProfileStore {
    /// Returns every profile currently holding `slug`.
    fn find_profiles_by_slug(&self, slug: &str) -> StoreResult<Vec<SlugOwner>>;
    fn get_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>>;
    fn get_profile_by_owner(&self, owner_id: OwnerId) -> StoreResult<Option<Profile>>;
    /// Looks up a profile by slug, only when it is published.
    fn get_published_profile_by_slug(&self, slug: &str) -> StoreResult<Option<Profile>>;
    /// Inserts or updates by profile id and returns the stored row.
    fn upsert_profile(&self, profile: &Profile) -> StoreResult<Profile>;
    /// Deletes a profile together with its links.
    fn delete_profile(&self, id: ProfileId) -> StoreResult<()>;
    /// Lists links of one card ordered by `display_order ASC, uuid ASC`.
    fn list_social_links(&self, card_id: CardId) -> StoreResult<Vec<SocialLink>>;
    /// Inserts a batch and returns the rows with assigned ids, in input order.
    fn insert_social_links(
        &self,
        card_id: CardId,
        links: &[NewSocialLink],
    ) -> StoreResult<Vec<SocialLink>>;
    /// Deletes a batch of links. Unknown ids are ignored.
    fn delete_social_links(&self, ids: &[LinkId]) -> StoreResult<()>;
}

impl<S: ProfileStore + ?Sized> ProfileStore for &S {
    fn find_profiles_by_slug(&self, slug: &str) -> StoreResult<Vec<SlugOwner>> {
        (**self).find_profiles_by_slug(slug)
    }

    fn get_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        (**self).get_profile(id)
    }

    fn get_profile_by_owner(&self, owner_id: OwnerId) -> StoreResult<Option<Profile>> {
        (**self).get_profile_by_owner(owner_id)
    }

    fn get_published_profile_by_slug(&self, slug: &str) -> StoreResult<Option<Profile>> {
        (**self).get_published_profile_by_slug(slug)
    }

    fn upsert_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        (**self).upsert_profile(profile)
    }

    fn delete_profile(&self, id: ProfileId) -> StoreResult<()> {
        (**self).delete_profile(id)
    }

    fn list_social_links(&self, card_id: CardId) -> StoreResult<Vec<SocialLink>> {
        (**self).list_social_links(card_id)
    }

    fn insert_social_links(
        &self,
        card_id: CardId,
        links: &[NewSocialLink],
    ) -> StoreResult<Vec<SocialLink>> {
        (**self).insert_social_links(card_id, links)
    }

    fn delete_social_links(&self, ids: &[LinkId]) -> StoreResult<()> {
        (**self).delete_social_links(ids)
    }
}

/// SQLite-backed profile store.
pub struct SqliteProfileStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileStore<'conn> {
    /// Wraps a migrated connection from `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileStore for SqliteProfileStore<'_> {
    fn find_profiles_by_slug(&self, slug: &str) -> StoreResult<Vec<SlugOwner>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, owner_uuid FROM profiles WHERE slug = ?1;")?;
        let mut rows = stmt.query([slug])?;
        let mut owners = Vec::new();
        while let Some(row) = rows.next()? {
            owners.push(SlugOwner {
                id: parse_uuid(row, "uuid", "profiles.uuid")?,
                owner_id: parse_uuid(row, "owner_uuid", "profiles.owner_uuid")?,
            });
        }
        Ok(owners)
    }

    fn get_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        self.query_one_profile("WHERE uuid = ?1", &id.to_string())
    }

    fn get_profile_by_owner(&self, owner_id: OwnerId) -> StoreResult<Option<Profile>> {
        self.query_one_profile("WHERE owner_uuid = ?1", &owner_id.to_string())
    }

    fn get_published_profile_by_slug(&self, slug: &str) -> StoreResult<Option<Profile>> {
        self.query_one_profile("WHERE slug = ?1 AND is_published = 1", slug)
    }

    fn upsert_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        let theme = encode_blob(&profile.theme, "theme")?;
        let layout = encode_blob(&profile.layout, "layout")?;
        let details = &profile.details;

        let result = self.conn.execute(
            "INSERT INTO profiles (
                uuid,
                owner_uuid,
                slug,
                global_handle,
                title,
                company,
                position,
                bio,
                phone,
                whatsapp,
                email,
                website,
                address,
                map_link,
                avatar_url,
                theme,
                layout,
                shape,
                is_published
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            ON CONFLICT(uuid) DO UPDATE SET
                slug = excluded.slug,
                global_handle = excluded.global_handle,
                title = excluded.title,
                company = excluded.company,
                position = excluded.position,
                bio = excluded.bio,
                phone = excluded.phone,
                whatsapp = excluded.whatsapp,
                email = excluded.email,
                website = excluded.website,
                address = excluded.address,
                map_link = excluded.map_link,
                avatar_url = excluded.avatar_url,
                theme = excluded.theme,
                layout = excluded.layout,
                shape = excluded.shape,
                is_published = excluded.is_published,
                updated_at = (strftime('%s', 'now') * 1000)
            WHERE profiles.owner_uuid = excluded.owner_uuid;",
            params![
                profile.id.to_string(),
                profile.owner_id.to_string(),
                profile.slug.as_str(),
                profile.global_handle.as_deref(),
                details.title.as_str(),
                details.company.as_str(),
                details.position.as_str(),
                details.bio.as_str(),
                details.phone.as_str(),
                details.whatsapp.as_str(),
                details.email.as_str(),
                details.website.as_str(),
                details.address.as_str(),
                details.map_link.as_str(),
                details.avatar_url.as_str(),
                theme,
                layout,
                profile.shape.as_str(),
                bool_to_int(profile.is_published),
            ],
        );

        match result {
            Ok(0) => {
                // Conflicting uuid belongs to another owner; the WHERE guard skipped it.
                return Err(StoreError::NotFound(profile.id));
            }
            Ok(_) => {}
            Err(err) if is_slug_unique_violation(&err) => {
                debug!(
                    "event=profile_upsert module=store status=conflict slug={}",
                    profile.slug
                );
                return Err(StoreError::SlugTaken(profile.slug.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        self.get_profile(profile.id)?
            .ok_or(StoreError::NotFound(profile.id))
    }

    fn delete_profile(&self, id: ProfileId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM profiles WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn list_social_links(&self, card_id: CardId) -> StoreResult<Vec<SocialLink>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LINK_SELECT_SQL}
             WHERE profile_uuid = ?1
             ORDER BY display_order ASC, created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([card_id.to_string()])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_link_row(row)?);
        }
        Ok(links)
    }

    fn insert_social_links(
        &self,
        card_id: CardId,
        links: &[NewSocialLink],
    ) -> StoreResult<Vec<SocialLink>> {
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let card_text = card_id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE uuid = ?1);",
            [card_text.as_str()],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StoreError::NotFound(card_id));
        }

        let mut inserted = Vec::with_capacity(links.len());
        for link in links {
            let id = Uuid::new_v4();
            tx.execute(
                "INSERT INTO social_links (
                    uuid,
                    profile_uuid,
                    platform,
                    handle,
                    url,
                    is_auto_synced,
                    is_active,
                    display_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7);",
                params![
                    id.to_string(),
                    card_text.as_str(),
                    link.platform.as_str(),
                    link.handle.as_str(),
                    link.url.as_str(),
                    bool_to_int(link.is_auto_synced),
                    link.display_order,
                ],
            )?;
            inserted.push(SocialLink {
                id,
                card_id,
                platform: link.platform.clone(),
                handle: link.handle.clone(),
                url: link.url.clone(),
                is_auto_synced: link.is_auto_synced,
                is_active: true,
                display_order: link.display_order,
            });
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn delete_social_links(&self, ids: &[LinkId]) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let tx = self.conn.unchecked_transaction()?;
        for id in ids {
            tx.execute("DELETE FROM social_links WHERE uuid = ?1;", [id.to_string()])?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl SqliteProfileStore<'_> {
    fn query_one_profile(&self, filter: &str, value: &str) -> StoreResult<Option<Profile>> {
        let row = self
            .conn
            .query_row(
                &format!("{PROFILE_SELECT_SQL} {filter};"),
                [value],
                |row| Ok(parse_profile_row(row)),
            )
            .optional()?;
        row.transpose()
    }
}

fn parse_profile_row(row: &Row<'_>) -> StoreResult<Profile> {
    let theme: Option<String> = row.get("theme")?;
    let layout: Option<String> = row.get("layout")?;

    Ok(Profile {
        id: parse_uuid(row, "uuid", "profiles.uuid")?,
        owner_id: parse_uuid(row, "owner_uuid", "profiles.owner_uuid")?,
        slug: row.get("slug")?,
        global_handle: row.get("global_handle")?,
        details: CardDetails {
            title: row.get("title")?,
            company: row.get("company")?,
            position: row.get("position")?,
            bio: row.get("bio")?,
            phone: row.get("phone")?,
            whatsapp: row.get("whatsapp")?,
            email: row.get("email")?,
            website: row.get("website")?,
            address: row.get("address")?,
            map_link: row.get("map_link")?,
            avatar_url: row.get("avatar_url")?,
        },
        theme: Theme::from_stored(theme.as_deref()),
        layout: Layout::from_stored(layout.as_deref()),
        shape: row.get("shape")?,
        is_published: parse_bool(row, "is_published", "profiles.is_published")?,
    })
}

fn parse_link_row(row: &Row<'_>) -> StoreResult<SocialLink> {
    Ok(SocialLink {
        id: parse_uuid(row, "uuid", "social_links.uuid")?,
        card_id: parse_uuid(row, "profile_uuid", "social_links.profile_uuid")?,
        platform: row.get("platform")?,
        handle: row.get("handle")?,
        url: row.get("url")?,
        is_auto_synced: parse_bool(row, "is_auto_synced", "social_links.is_auto_synced")?,
        is_active: parse_bool(row, "is_active", "social_links.is_active")?,
        display_order: row.get("display_order")?,
    })
}

fn parse_uuid(row: &Row<'_>, column: &str, label: &str) -> StoreResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{text}` in {label}")))
}

fn parse_bool(row: &Row<'_>, column: &str, label: &str) -> StoreResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean value `{other}` in {label}"
        ))),
    }
}

fn encode_blob<T: serde::Serialize>(value: &T, field: &str) -> StoreResult<String> {
    serde_json::to_string(value)
        .map_err(|err| StoreError::InvalidData(format!("cannot encode {field}: {err}")))
}

fn is_slug_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && message
                    .as_deref()
                    .is_some_and(|text| text.contains("profiles.slug"))
        }
        _ => false,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
