use rusqlite::{Connection, TransactionBehavior};
use std::time::Duration;
use taskhub_core::db::{open_db, open_db_in_memory};
use taskhub_core::{
    MembershipError, MembershipOutcome, MembershipService, NewProject, NewUser, ProjectId,
    ProjectRepository, ProjectService, ProjectStatus, SqliteProjectRepository,
    SqliteUserRepository, UserId, UserRepository, UserService,
};

fn seed_users(conn: &mut Connection, count: usize) -> Vec<UserId> {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    (0..count)
        .map(|index| {
            repo.create_user(
                &NewUser::new(format!("user{index}"), "member", format!("user{index}@example.com")),
                "$argon2id$fixture",
            )
            .unwrap()
            .id
        })
        .collect()
}

fn seed_project(conn: &Connection, name: &str, max_members: u32) -> ProjectId {
    let service = ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap());
    service
        .create_project(&NewProject::new(name, max_members))
        .unwrap()
        .id
}

fn member_ids(conn: &Connection, project_id: ProjectId) -> Vec<UserId> {
    let repo = SqliteProjectRepository::try_new(conn).unwrap();
    repo.list_members(project_id)
        .unwrap()
        .into_iter()
        .map(|user| user.id)
        .collect()
}

#[test]
fn add_fills_capacity_in_request_order() {
    let mut conn = open_db_in_memory().unwrap();
    let users = seed_users(&mut conn, 4);
    let project = seed_project(&conn, "Alpha", 2);

    let log = MembershipService::new(&mut conn)
        .add_members(project, &users)
        .unwrap();

    assert_eq!(log.get(users[0]), Some(MembershipOutcome::MemberAdded));
    assert_eq!(log.get(users[1]), Some(MembershipOutcome::MemberAdded));
    assert_eq!(
        log.get(users[2]),
        Some(MembershipOutcome::MemberLimitReached)
    );
    assert_eq!(
        log.get(users[3]),
        Some(MembershipOutcome::MemberLimitReached)
    );
    assert_eq!(member_ids(&conn, project), vec![users[0], users[1]]);
}

#[test]
fn global_cap_counts_other_projects_only() {
    let mut conn = open_db_in_memory().unwrap();
    let users = seed_users(&mut conn, 1);
    let alpha = seed_project(&conn, "Alpha", 5);
    let beta = seed_project(&conn, "Beta", 5);
    let gamma = seed_project(&conn, "Gamma", 5);
    let mut service = MembershipService::new(&mut conn);

    service.add_members(alpha, &users).unwrap();
    service.add_members(beta, &users).unwrap();

    let again = service.add_members(beta, &users).unwrap();
    assert_eq!(again.get(users[0]), Some(MembershipOutcome::AlreadyMember));

    let third = service.add_members(gamma, &users).unwrap();
    assert_eq!(
        third.get(users[0]),
        Some(MembershipOutcome::AlreadyInTwoProjects)
    );
    assert!(member_ids(&conn, gamma).is_empty());
}

#[test]
fn add_then_remove_restores_membership() {
    let mut conn = open_db_in_memory().unwrap();
    let users = seed_users(&mut conn, 2);
    let project = seed_project(&conn, "Alpha", 3);
    let mut service = MembershipService::new(&mut conn);

    service.add_members(project, &users).unwrap();
    let removed = service.remove_members(project, &users).unwrap();
    assert_eq!(
        removed.ids_with(MembershipOutcome::MemberRemoved),
        users.clone()
    );

    let repeat = service.remove_members(project, &users).unwrap();
    assert_eq!(repeat.count(MembershipOutcome::NotAMember), 2);
    assert!(member_ids(&conn, project).is_empty());
}

#[test]
fn duplicate_ids_are_decided_once() {
    let mut conn = open_db_in_memory().unwrap();
    let users = seed_users(&mut conn, 1);
    let project = seed_project(&conn, "Alpha", 5);

    let log = MembershipService::new(&mut conn)
        .add_members(project, &[users[0], users[0], users[0]])
        .unwrap();

    assert_eq!(log.len(), 1);
    assert_eq!(log.get(users[0]), Some(MembershipOutcome::MemberAdded));
    assert_eq!(member_ids(&conn, project), vec![users[0]]);
}

#[test]
fn soft_delete_releases_memberships_without_exceeding_capacity() {
    let mut conn = open_db_in_memory().unwrap();
    let users = seed_users(&mut conn, 4);
    let project = seed_project(&conn, "Alpha", 2);
    MembershipService::new(&mut conn)
        .add_members(project, &users[..2])
        .unwrap();

    UserService::new(SqliteUserRepository::try_new(&mut conn).unwrap())
        .delete_user(users[0])
        .unwrap();
    assert_eq!(membership_rows(&conn, project), 1);

    let mut service = MembershipService::new(&mut conn);
    let removed = service.remove_members(project, &[users[0]]).unwrap();
    assert_eq!(
        removed.get(users[0]),
        Some(MembershipOutcome::UserDoesNotExist)
    );

    let added = service.add_members(project, &[users[2], users[3]]).unwrap();
    assert_eq!(added.get(users[2]), Some(MembershipOutcome::MemberAdded));
    assert_eq!(
        added.get(users[3]),
        Some(MembershipOutcome::MemberLimitReached)
    );
    assert_eq!(membership_rows(&conn, project), 2);
    assert_eq!(member_ids(&conn, project), vec![users[1], users[2]]);
}

fn membership_rows(conn: &Connection, project_id: ProjectId) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM project_members WHERE project_id = ?1;",
        [project_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn missing_project_and_empty_request_fail_without_writes() {
    let mut conn = open_db_in_memory().unwrap();
    let users = seed_users(&mut conn, 1);
    let mut service = MembershipService::new(&mut conn);

    assert!(matches!(
        service.add_members(404, &users),
        Err(MembershipError::ProjectNotFound(404))
    ));
    assert!(matches!(
        service.add_members(404, &[]),
        Err(MembershipError::EmptyRequest)
    ));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM project_members;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn held_write_lock_surfaces_as_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskhub.db");

    let mut writer = open_db(&path).unwrap();
    let users = seed_users(&mut writer, 1);
    let project = seed_project(&writer, "Alpha", 2);

    let mut contender = open_db(&path).unwrap();
    contender.busy_timeout(Duration::ZERO).unwrap();

    let lock = writer
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .unwrap();
    let err = MembershipService::new(&mut contender)
        .add_members(project, &users)
        .unwrap_err();
    assert!(matches!(err, MembershipError::Conflict(_)));
    lock.rollback().unwrap();

    let log = MembershipService::new(&mut contender)
        .add_members(project, &users)
        .unwrap();
    assert_eq!(log.get(users[0]), Some(MembershipOutcome::MemberAdded));
}

#[test]
fn project_status_and_counts_round_trip() {
    let mut conn = open_db_in_memory().unwrap();
    let users = seed_users(&mut conn, 2);
    let project = seed_project(&conn, "Alpha", 3);
    MembershipService::new(&mut conn)
        .add_members(project, &users)
        .unwrap();

    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    service
        .set_status(project, ProjectStatus::InProgress)
        .unwrap();

    let loaded = service.get_project(project).unwrap().unwrap();
    assert_eq!(loaded.status, ProjectStatus::InProgress);
    assert_eq!(loaded.member_count, 2);
    assert!(loaded.has_capacity());
    assert_eq!(service.list_projects().unwrap().len(), 1);
    assert!(service.get_project(project + 1).unwrap().is_none());
}
