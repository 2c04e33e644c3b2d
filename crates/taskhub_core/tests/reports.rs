use rusqlite::{params, Connection};
use taskhub_core::db::open_db_in_memory;
use taskhub_core::report::{
    completed_todos_between, project_details, project_wise_report,
    projects_with_member_name_edge, todos_with_creator, top_pending_users, user_todo_stats,
    user_wise_project_status, users_with_pending_count,
};
use taskhub_core::{
    MembershipService, NewProject, NewUser, ProjectId, ProjectRepository, ProjectStatus,
    SqliteProjectRepository, SqliteUserRepository, UserId, UserRepository, UserService,
};

fn seed_user(conn: &mut Connection, first_name: &str) -> UserId {
    seed_named_user(conn, first_name, "Tester")
}

fn seed_named_user(conn: &mut Connection, first_name: &str, last_name: &str) -> UserId {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    repo.create_user(
        &NewUser::new(first_name, last_name, format!("{first_name}@example.com")),
        "$argon2id$fixture",
    )
    .unwrap()
    .id
}

fn seed_project(conn: &Connection, name: &str, status: ProjectStatus) -> ProjectId {
    let repo = SqliteProjectRepository::try_new(conn).unwrap();
    let id = repo.create_project(&NewProject::new(name, 2)).unwrap().id;
    repo.update_status(id, status).unwrap();
    id
}

fn seed_todo(conn: &Connection, user_id: UserId, name: &str, done: bool, created_ms: i64) {
    conn.execute(
        "INSERT INTO todos (user_id, name, done, date_created, date_completed)
         VALUES (?1, ?2, ?3, ?4, CASE WHEN ?3 = 1 THEN ?4 + 60000 END);",
        params![user_id, name, i64::from(done), created_ms],
    )
    .unwrap();
}

#[test]
fn project_details_report_labels_and_counts() {
    let mut conn = open_db_in_memory().unwrap();
    let ada = seed_user(&mut conn, "ada");
    let project = {
        let repo = SqliteProjectRepository::try_new(&conn).unwrap();
        repo.create_project(&NewProject::new("Apollo", 4)).unwrap().id
    };
    MembershipService::new(&mut conn)
        .add_members(project, &[ada])
        .unwrap();

    let rows = project_details(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Apollo");
    assert_eq!(rows[0].status, "To be started");
    assert_eq!(rows[0].existing_member_count, 1);
    assert_eq!(rows[0].max_members, 4);

    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["existing_member_count"], 1);
}

#[test]
fn todo_stats_skip_deleted_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let ada = seed_user(&mut conn, "ada");
    let bob = seed_user(&mut conn, "bob");
    let gone = seed_user(&mut conn, "gone");
    seed_todo(&conn, ada, "a1", true, 1_000);
    seed_todo(&conn, ada, "a2", false, 2_000);
    seed_todo(&conn, bob, "b1", false, 3_000);
    seed_todo(&conn, gone, "g1", false, 4_000);
    conn.execute("UPDATE todos SET deleted = 1 WHERE name = 'a2';", [])
        .unwrap();
    UserService::new(SqliteUserRepository::try_new(&mut conn).unwrap())
        .delete_user(gone)
        .unwrap();

    let stats = user_todo_stats(&conn).unwrap();
    let summary = stats
        .iter()
        .map(|row| (row.id, row.completed_count, row.pending_count))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![(ada, 1, 0), (bob, 0, 1)]);
}

#[test]
fn top_pending_orders_by_pending_count_then_id() {
    let mut conn = open_db_in_memory().unwrap();
    let users = ["ada", "bob", "cy", "dee", "eve", "fay"]
        .into_iter()
        .map(|name| seed_user(&mut conn, name))
        .collect::<Vec<_>>();
    for (index, user_id) in users.iter().enumerate() {
        for todo in 0..index {
            seed_todo(&conn, *user_id, &format!("t{todo}"), false, 1_000);
        }
    }

    let top = top_pending_users(&conn, None).unwrap();
    let ids = top.iter().map(|row| row.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![users[5], users[4], users[3], users[2], users[1]]);

    let top_two = top_pending_users(&conn, Some(2)).unwrap();
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[0].pending_count, 5);
    assert!(top_pending_users(&conn, Some(0)).unwrap().is_empty());
}

#[test]
fn completed_range_is_inclusive_and_oldest_first() {
    let mut conn = open_db_in_memory().unwrap();
    let ada = seed_user(&mut conn, "ada");
    seed_todo(&conn, ada, "late", true, 3_000);
    seed_todo(&conn, ada, "early", true, 1_000);
    seed_todo(&conn, ada, "outside", true, 5_000);
    seed_todo(&conn, ada, "pending", false, 2_000);

    let rows = completed_todos_between(&conn, 1_000, 3_000).unwrap();
    let names = rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["early", "late"]);
    assert_eq!(rows[0].creator, "ada Tester");
    assert_eq!(rows[0].email, "ada@example.com");
    assert_eq!(rows[0].date_completed, Some(61_000));

    assert!(completed_todos_between(&conn, 3_001, 1_000)
        .unwrap()
        .is_empty());
}

#[test]
fn todos_with_creator_nests_creator_and_labels_status() {
    let mut conn = open_db_in_memory().unwrap();
    let ada = seed_user(&mut conn, "ada");
    let gone = seed_user(&mut conn, "gone");
    seed_todo(&conn, ada, "write", false, 1_000);
    seed_todo(&conn, ada, "ship", true, 2_000);
    seed_todo(&conn, gone, "lost", false, 3_000);
    UserService::new(SqliteUserRepository::try_new(&mut conn).unwrap())
        .delete_user(gone)
        .unwrap();

    let rows = todos_with_creator(&conn).unwrap();
    let summary = rows
        .iter()
        .map(|row| (row.name.as_str(), row.status.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![("write", "To Do"), ("ship", "Done")]);
    assert_eq!(rows[0].date_created, 1_000);

    let json = serde_json::to_value(&rows[1]).unwrap();
    assert_eq!(json["creator"]["first_name"], "ada");
    assert_eq!(json["creator"]["last_name"], "Tester");
    assert_eq!(json["creator"]["email"], "ada@example.com");
}

#[test]
fn users_with_pending_count_matches_exactly() {
    let mut conn = open_db_in_memory().unwrap();
    let ada = seed_user(&mut conn, "ada");
    let bob = seed_user(&mut conn, "bob");
    let cy = seed_user(&mut conn, "cy");
    seed_todo(&conn, ada, "a1", false, 1_000);
    seed_todo(&conn, ada, "a2", false, 1_000);
    seed_todo(&conn, bob, "b1", false, 1_000);
    seed_todo(&conn, bob, "b2", true, 1_000);
    seed_todo(&conn, cy, "c1", false, 1_000);
    seed_todo(&conn, cy, "c2", false, 1_000);
    seed_todo(&conn, cy, "c3", false, 1_000);
    conn.execute("UPDATE todos SET deleted = 1 WHERE name = 'c3';", [])
        .unwrap();

    let two = users_with_pending_count(&conn, 2).unwrap();
    let ids = two.iter().map(|row| row.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![ada, cy]);

    let one = users_with_pending_count(&conn, 1).unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!((one[0].id, one[0].completed_count), (bob, 1));

    assert!(users_with_pending_count(&conn, 3).unwrap().is_empty());
}

#[test]
fn member_name_edge_matches_first_initial_or_last_final_letter() {
    let mut conn = open_db_in_memory().unwrap();
    let anna = seed_named_user(&mut conn, "Anna", "Smith");
    let bob = seed_named_user(&mut conn, "bob", "Costa");
    let cy = seed_named_user(&mut conn, "cy", "Jones");
    let apollo = seed_project(&conn, "Apollo", ProjectStatus::Completed);
    let borealis = seed_project(&conn, "Borealis", ProjectStatus::InProgress);
    let cosmos = seed_project(&conn, "Cosmos", ProjectStatus::ToBeStarted);
    seed_project(&conn, "Empty", ProjectStatus::ToBeStarted);

    let mut service = MembershipService::new(&mut conn);
    service.add_members(apollo, &[anna, bob]).unwrap();
    service.add_members(borealis, &[bob]).unwrap();
    service.add_members(cosmos, &[cy]).unwrap();

    let rows = projects_with_member_name_edge(&conn, 'a').unwrap();
    let summary = rows
        .iter()
        .map(|row| (row.project_name.as_str(), row.done, row.max_members))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![("Apollo", true, 2), ("Borealis", false, 2)]);

    assert_eq!(
        projects_with_member_name_edge(&conn, 'A').unwrap(),
        rows
    );
    assert!(projects_with_member_name_edge(&conn, 'z').unwrap().is_empty());
}

#[test]
fn project_wise_report_groups_members_by_email() {
    let mut conn = open_db_in_memory().unwrap();
    let zed = seed_user(&mut conn, "zed");
    let ada = seed_user(&mut conn, "ada");
    let apollo = seed_project(&conn, "Apollo", ProjectStatus::InProgress);
    seed_project(&conn, "Idle", ProjectStatus::ToBeStarted);
    seed_todo(&conn, ada, "a1", false, 1_000);
    seed_todo(&conn, ada, "a2", true, 1_000);
    seed_todo(&conn, zed, "z1", false, 1_000);
    seed_todo(&conn, zed, "z2", false, 1_000);
    MembershipService::new(&mut conn)
        .add_members(apollo, &[zed, ada])
        .unwrap();

    let report = project_wise_report(&conn).unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].project_title, "Apollo");
    let members = report[0]
        .report
        .iter()
        .map(|row| (row.email.as_str(), row.pending_count, row.completed_count))
        .collect::<Vec<_>>();
    assert_eq!(
        members,
        vec![("ada@example.com", 1, 1), ("zed@example.com", 2, 0)]
    );
    assert_eq!(report[1].project_title, "Idle");
    assert!(report[1].report.is_empty());

    UserService::new(SqliteUserRepository::try_new(&mut conn).unwrap())
        .delete_user(zed)
        .unwrap();
    let report = project_wise_report(&conn).unwrap();
    assert_eq!(report[0].report.len(), 1);
    assert_eq!(report[0].report[0].first_name, "ada");
}

#[test]
fn user_wise_project_status_buckets_by_status() {
    let mut conn = open_db_in_memory().unwrap();
    let ada = seed_user(&mut conn, "ada");
    let bob = seed_user(&mut conn, "bob");
    let apollo = seed_project(&conn, "Apollo", ProjectStatus::InProgress);
    let borealis = seed_project(&conn, "Borealis", ProjectStatus::Completed);
    let cosmos = seed_project(&conn, "Cosmos", ProjectStatus::ToBeStarted);

    let mut service = MembershipService::new(&mut conn);
    service.add_members(apollo, &[ada]).unwrap();
    service.add_members(borealis, &[ada]).unwrap();
    service.add_members(cosmos, &[bob]).unwrap();

    let rows = user_wise_project_status(&conn).unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].id, ada);
    assert!(rows[0].to_do_projects.is_empty());
    assert_eq!(rows[0].in_progress_projects, vec!["Apollo".to_string()]);
    assert_eq!(rows[0].completed_projects, vec!["Borealis".to_string()]);

    assert_eq!(rows[1].id, bob);
    assert_eq!(rows[1].to_do_projects, vec!["Cosmos".to_string()]);
    assert!(rows[1].in_progress_projects.is_empty());
    assert!(rows[1].completed_projects.is_empty());
}
