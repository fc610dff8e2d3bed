//! Shared fixture for the operation tests

use crate::OkrCore;
use shared::credential::hash_password;
use shared::{AppConfig, Class, Period, PeriodStatus, Relationship, Role, User};
use store::{
    ClassRepository, InMemoryStore, PeriodRepository, RelationshipRepository, UserRepository,
};

/// Every seeded account's password is `<local part>-pass`
fn account(email: &str, name: &str, role: Role) -> User {
    let local = email.split('@').next().unwrap_or(email);
    User::new(email, name, role).with_password_hash(hash_password(&format!("{}-pass", local)))
}

/// Two classes with one homeroom teacher and one student each, a parent
/// linked to `hs`, an open period HK1 and a closed period HK0.
pub(crate) fn core() -> OkrCore<InMemoryStore> {
    let mut store = InMemoryStore::new();

    for user in [
        account("admin@school.vn", "Quản trị", Role::Admin),
        account("gv@school.vn", "Cô Lan", Role::Teacher),
        account("gv2@school.vn", "Thầy Nam", Role::Teacher),
        account("hs@school.vn", "Minh", Role::Student).with_class("10A1"),
        account("hs2@school.vn", "An", Role::Student).with_class("10A2"),
        account("ph@school.vn", "Bố Minh", Role::Parent),
    ] {
        store.insert_user(&user).unwrap();
    }

    store
        .insert_class(&Class::new("10A1").with_teacher("gv@school.vn").with_size(40))
        .unwrap();
    store
        .insert_class(&Class::new("10A2").with_teacher("gv2@school.vn").with_size(38))
        .unwrap();

    store.insert_period(&Period::new("HK1", "Học kỳ 1")).unwrap();
    let mut closed = Period::new("HK0", "Năm trước");
    closed.status = PeriodStatus::Closed;
    store.insert_period(&closed).unwrap();

    store
        .insert_relationship(&Relationship::new("hs@school.vn", "ph@school.vn"))
        .unwrap();

    let config = AppConfig {
        max_failed_logins: 3,
        ..Default::default()
    };
    OkrCore::new(store, &config)
}

/// Log a seeded account in and return its token
pub(crate) fn login(core: &mut OkrCore<InMemoryStore>, email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    core.login(email, &format!("{}-pass", local)).unwrap().token
}
