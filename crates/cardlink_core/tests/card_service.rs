use cardlink_core::db::open_db_in_memory;
use cardlink_core::{
    CardDetails, CardId, CardService, CardServiceError, HandleError, LinkId, NewSocialLink,
    OwnerId, Profile, ProfileId, ProfileStore, SaveCardRequest, SlugAvailability, SlugOwner,
    SocialLink, SqliteProfileStore, StoreResult, Theme,
};
use std::cell::Cell;
use uuid::Uuid;

const ELIGIBLE_PLATFORMS: usize = 7;

fn request(slug: &str, handle: Option<&str>) -> SaveCardRequest {
    SaveCardRequest {
        slug: slug.to_string(),
        global_handle: handle.map(str::to_string),
        details: CardDetails {
            title: "Jane Doe".to_string(),
            company: "Acme".to_string(),
            ..CardDetails::default()
        },
        ..SaveCardRequest::default()
    }
}

/// Store wrapper that lets a rival owner grab the slug right before writes.
struct RacingStore<'conn> {
    inner: SqliteProfileStore<'conn>,
    steals_left: Cell<u32>,
}

impl<'conn> RacingStore<'conn> {
    fn new(inner: SqliteProfileStore<'conn>, steals: u32) -> Self {
        Self {
            inner,
            steals_left: Cell::new(steals),
        }
    }
}

impl ProfileStore for RacingStore<'_> {
    fn find_profiles_by_slug(&self, slug: &str) -> StoreResult<Vec<SlugOwner>> {
        self.inner.find_profiles_by_slug(slug)
    }

    fn get_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        self.inner.get_profile(id)
    }

    fn get_profile_by_owner(&self, owner_id: OwnerId) -> StoreResult<Option<Profile>> {
        self.inner.get_profile_by_owner(owner_id)
    }

    fn get_published_profile_by_slug(&self, slug: &str) -> StoreResult<Option<Profile>> {
        self.inner.get_published_profile_by_slug(slug)
    }

    fn upsert_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        if self.steals_left.get() > 0 {
            self.steals_left.set(self.steals_left.get() - 1);
            let rival = Profile::new(Uuid::new_v4(), profile.slug.clone());
            self.inner.upsert_profile(&rival)?;
        }
        self.inner.upsert_profile(profile)
    }

    fn delete_profile(&self, id: ProfileId) -> StoreResult<()> {
        self.inner.delete_profile(id)
    }

    fn list_social_links(&self, card_id: CardId) -> StoreResult<Vec<SocialLink>> {
        self.inner.list_social_links(card_id)
    }

    fn insert_social_links(
        &self,
        card_id: CardId,
        links: &[NewSocialLink],
    ) -> StoreResult<Vec<SocialLink>> {
        self.inner.insert_social_links(card_id, links)
    }

    fn delete_social_links(&self, ids: &[LinkId]) -> StoreResult<()> {
        self.inner.delete_social_links(ids)
    }
}

#[test]
fn save_normalizes_slug_and_generates_auto_synced_links() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();

    let saved = service
        .save_card(owner, &request("Jane Doe!", Some("@Jane_D")))
        .unwrap();

    assert_eq!(saved.profile.slug, "janedoe");
    assert_eq!(saved.profile.global_handle.as_deref(), Some("jane_d"));
    assert_eq!(saved.profile.details.company, "Acme");
    assert_eq!(saved.profile.theme, Theme::default());
    assert_eq!(saved.links.len(), ELIGIBLE_PLATFORMS);
    assert!(saved
        .links
        .iter()
        .all(|link| link.is_auto_synced && link.handle == "jane_d"));
}

#[test]
fn second_owner_gets_suffixed_slug() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));

    let first = service
        .save_card(Uuid::new_v4(), &request("janedoe", None))
        .unwrap();
    let second = service
        .save_card(Uuid::new_v4(), &request("janedoe", None))
        .unwrap();

    assert_eq!(first.profile.slug, "janedoe");
    assert_eq!(second.profile.slug, "janedoe1");
}

#[test]
fn resaving_keeps_slug_and_identity_and_is_noop_for_links() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();

    let first = service
        .save_card(owner, &request("janedoe", Some("jane")))
        .unwrap();
    let second = service
        .save_card(owner, &request("janedoe", Some("jane")))
        .unwrap();

    assert_eq!(second.profile.id, first.profile.id);
    assert_eq!(second.profile.slug, "janedoe");
    assert!(second.plan.is_empty());
    assert_eq!(second.links, first.links);
}

#[test]
fn handle_change_replaces_auto_links_and_keeps_manual_links() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();

    service
        .save_card(owner, &request("janedoe", Some("jane")))
        .unwrap();
    let manual = service
        .add_social_link(owner, "linkedin", "jane-doe-42")
        .unwrap();
    assert_eq!(manual.platform, "LinkedIn");
    assert_eq!(manual.display_order, ELIGIBLE_PLATFORMS as i64);

    let changed = service
        .save_card(owner, &request("janedoe", Some("jdoe")))
        .unwrap();
    assert_eq!(changed.plan.to_delete.len(), ELIGIBLE_PLATFORMS);
    assert_eq!(changed.plan.to_insert.len(), ELIGIBLE_PLATFORMS);
    assert_eq!(changed.links.len(), ELIGIBLE_PLATFORMS + 1);
    assert_eq!(changed.links[0].id, manual.id);
    assert!(changed
        .links
        .iter()
        .filter(|link| link.is_auto_synced)
        .all(|link| link.handle == "jdoe"));
}

#[test]
fn clearing_handle_removes_auto_links_only() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();

    service
        .save_card(owner, &request("janedoe", Some("jane")))
        .unwrap();
    let manual = service.add_social_link(owner, "Instagram", "jane.art").unwrap();

    let cleared = service.save_card(owner, &request("janedoe", None)).unwrap();
    assert_eq!(cleared.profile.global_handle, None);
    assert_eq!(cleared.links, vec![manual]);
}

#[test]
fn save_rejects_blank_title_and_short_slug() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();

    let mut blank = request("janedoe", None);
    blank.details.title = "   ".to_string();
    assert!(matches!(
        service.save_card(owner, &blank).unwrap_err(),
        CardServiceError::InvalidTitle
    ));

    assert!(matches!(
        service.save_card(owner, &request("a!b", None)).unwrap_err(),
        CardServiceError::Handle(HandleError::InvalidSlug { .. })
    ));
    assert!(service.store().get_profile_by_owner(owner).unwrap().is_none());
}

#[test]
fn storage_conflict_triggers_one_reallocation() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(RacingStore::new(SqliteProfileStore::new(&conn), 1));

    let saved = service
        .save_card(Uuid::new_v4(), &request("janedoe", None))
        .unwrap();
    assert_eq!(saved.profile.slug, "janedoe1");
}

#[test]
fn repeated_storage_conflict_surfaces_slug_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(RacingStore::new(SqliteProfileStore::new(&conn), 2));
    let owner = Uuid::new_v4();

    let err = service
        .save_card(owner, &request("janedoe", None))
        .unwrap_err();
    match err {
        CardServiceError::Handle(HandleError::SlugConflict(slug)) => assert_eq!(slug, "janedoe1"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.store().get_profile_by_owner(owner).unwrap().is_none());
}

#[test]
fn check_slug_normalizes_before_probing() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();
    service.save_card(owner, &request("janedoe", None)).unwrap();

    assert_eq!(
        service.check_slug("JaneDoe", Uuid::new_v4()).unwrap(),
        SlugAvailability::Taken
    );
    assert_eq!(
        service.check_slug("JaneDoe", owner).unwrap(),
        SlugAvailability::Available
    );
    assert_eq!(
        service.check_slug("j!", owner).unwrap(),
        SlugAvailability::TooShort
    );
}

#[test]
fn manual_link_requires_known_platform_and_saved_card() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();

    assert!(matches!(
        service.add_social_link(owner, "GitHub", "jane").unwrap_err(),
        CardServiceError::ProfileNotFound(id) if id == owner
    ));

    service.save_card(owner, &request("janedoe", None)).unwrap();
    assert!(matches!(
        service.add_social_link(owner, "Bogus", "jane").unwrap_err(),
        CardServiceError::Handle(HandleError::UnknownPlatform(_))
    ));
    assert!(matches!(
        service.add_social_link(owner, "GitHub", "  ").unwrap_err(),
        CardServiceError::Handle(HandleError::InvalidHandle)
    ));

    let first = service.add_social_link(owner, "GitHub", "jane").unwrap();
    let second = service.add_social_link(owner, "WhatsApp", "15550100").unwrap();
    assert!(!first.is_auto_synced);
    assert_eq!(first.url, "https://github.com/jane");
    assert_eq!(second.display_order, first.display_order + 1);
}

#[test]
fn add_link_after_max_display_order_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();
    let saved = service.save_card(owner, &request("janedoe", None)).unwrap();
    service
        .store()
        .insert_social_links(
            saved.profile.id,
            &[NewSocialLink {
                platform: "GitHub".to_string(),
                handle: "jane".to_string(),
                url: "https://github.com/jane".to_string(),
                is_auto_synced: false,
                display_order: i64::MAX,
            }],
        )
        .unwrap();

    let err = service
        .add_social_link(owner, "LinkedIn", "jane")
        .unwrap_err();
    assert!(matches!(
        err,
        CardServiceError::Handle(HandleError::DisplayOrderOverflow { after }) if after == i64::MAX
    ));
    assert_eq!(
        service.store().list_social_links(saved.profile.id).unwrap().len(),
        1
    );
}

#[test]
fn remove_link_only_touches_owners_card() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    service.save_card(alice, &request("alice", None)).unwrap();
    service.save_card(bob, &request("bobby", None)).unwrap();
    let alice_link = service.add_social_link(alice, "GitHub", "alice").unwrap();

    assert!(matches!(
        service.remove_social_link(bob, alice_link.id).unwrap_err(),
        CardServiceError::LinkNotFound(id) if id == alice_link.id
    ));

    service.remove_social_link(alice, alice_link.id).unwrap();
    let profile = service.store().get_profile_by_owner(alice).unwrap().unwrap();
    assert!(service
        .store()
        .list_social_links(profile.id)
        .unwrap()
        .is_empty());
}

#[test]
fn public_card_requires_published_profile() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();

    service
        .save_card(owner, &request("janedoe", Some("jane")))
        .unwrap();
    assert!(service.load_public_card("janedoe").unwrap().is_none());

    let mut published = request("janedoe", Some("jane"));
    published.is_published = true;
    published.theme = Theme::preset_named("Dark Mode");
    service.save_card(owner, &published).unwrap();

    let card = service.load_public_card("JaneDoe").unwrap().unwrap();
    assert_eq!(card.profile.owner_id, owner);
    assert_eq!(card.profile.theme.name, "Dark Mode");
    assert_eq!(card.links.len(), ELIGIBLE_PLATFORMS);
    assert!(service.load_public_card("nobody").unwrap().is_none());
}

#[test]
fn delete_card_removes_links_with_profile() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();
    let saved = service
        .save_card(owner, &request("janedoe", Some("jane")))
        .unwrap();

    service.delete_card(owner).unwrap();

    assert!(service.store().get_profile(saved.profile.id).unwrap().is_none());
    assert!(service
        .store()
        .list_social_links(saved.profile.id)
        .unwrap()
        .is_empty());
    assert!(matches!(
        service.delete_card(owner).unwrap_err(),
        CardServiceError::ProfileNotFound(_)
    ));
}

#[test]
fn sync_social_links_restores_deleted_auto_link() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteProfileStore::new(&conn));
    let owner = Uuid::new_v4();
    let saved = service
        .save_card(owner, &request("janedoe", Some("jane")))
        .unwrap();

    service
        .remove_social_link(owner, saved.links[0].id)
        .unwrap();
    let outcome = service.sync_social_links(owner).unwrap();

    assert_eq!(outcome.plan.to_delete.len(), ELIGIBLE_PLATFORMS - 1);
    assert_eq!(outcome.links.len(), ELIGIBLE_PLATFORMS);
}
