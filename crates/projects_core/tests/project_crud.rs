use projects_core::{
    NewProject, Project, ProjectRepository, RepoError, SqliteProjectRepository, StoreConfig,
};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    repo: SqliteProjectRepository,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("projects.sqlite3"));
        Self {
            _dir: dir,
            repo: SqliteProjectRepository::new(config),
        }
    }

    fn conn(&self) -> Connection {
        self.repo.config().open().unwrap()
    }
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn new_project(name: &str) -> NewProject {
    NewProject {
        project_name: name.to_string(),
        estimated_hours: dec("4"),
        actual_hours: dec("1.5"),
        difficulty: 2,
        notes: Some(format!("notes for {name}")),
    }
}

#[test]
fn insert_assigns_id_and_fetch_returns_same_record() {
    let fixture = Fixture::new();

    let inserted = fixture
        .repo
        .insert_project(NewProject {
            project_name: "Build shed".to_string(),
            estimated_hours: dec("10"),
            actual_hours: dec("0"),
            difficulty: 3,
            notes: None,
        })
        .unwrap();
    assert!(inserted.project_id > 0);

    let loaded = fixture
        .repo
        .fetch_project_by_id(inserted.project_id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, inserted);
    assert_eq!(loaded.estimated_hours.to_string(), "10.00");
    assert_eq!(loaded.actual_hours.to_string(), "0.00");
    assert_eq!(loaded.notes, None);
    assert!(loaded.materials.is_empty());
    assert!(loaded.steps.is_empty());
    assert!(loaded.categories.is_empty());
}

#[test]
fn hours_are_normalized_to_two_decimal_places() {
    let fixture = Fixture::new();

    let inserted = fixture
        .repo
        .insert_project(NewProject {
            estimated_hours: dec("2.349"),
            actual_hours: dec("7.5"),
            ..new_project("Paint fence")
        })
        .unwrap();
    assert_eq!(inserted.estimated_hours, dec("2.349"));

    let loaded = fixture
        .repo
        .fetch_project_by_id(inserted.project_id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.estimated_hours.to_string(), "2.35");
    assert_eq!(loaded.actual_hours.to_string(), "7.50");
    assert_eq!(loaded.project_name, inserted.project_name);
    assert_eq!(loaded.difficulty, inserted.difficulty);
    assert_eq!(loaded.notes, inserted.notes);
}

#[test]
fn fetch_by_id_returns_none_for_missing_project() {
    let fixture = Fixture::new();
    assert!(fixture.repo.fetch_project_by_id(42).unwrap().is_none());
}

#[test]
fn fetch_by_id_attaches_materials_steps_and_categories() {
    let fixture = Fixture::new();
    let project = fixture.repo.insert_project(new_project("Garden bed")).unwrap();
    let other = fixture.repo.insert_project(new_project("Bird house")).unwrap();

    let conn = fixture.conn();
    conn.execute_batch(
        "INSERT INTO category (category_name) VALUES ('Garden'), ('Woodworking'), ('Paint');",
    )
    .unwrap();
    for (name, count, cost) in [("Cedar board", 6, "12.5"), ("Screws", 40, "0.1")] {
        conn.execute(
            "INSERT INTO material (project_id, material_name, num_required, cost)
             VALUES (?1, ?2, ?3, ?4);",
            params![project.project_id, name, count, cost],
        )
        .unwrap();
    }
    for (text, order) in [("Fill with soil", 3), ("Cut boards", 1), ("Assemble", 2)] {
        conn.execute(
            "INSERT INTO step (project_id, step_text, step_order) VALUES (?1, ?2, ?3);",
            params![project.project_id, text, order],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO project_category (project_id, category_id)
         SELECT ?1, category_id FROM category WHERE category_name IN ('Garden', 'Woodworking');",
        [project.project_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO material (project_id, material_name) VALUES (?1, 'Roof shingle');",
        [other.project_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO project_category (project_id, category_id)
         SELECT ?1, category_id FROM category WHERE category_name = 'Paint';",
        [other.project_id],
    )
    .unwrap();
    drop(conn);

    let loaded = fixture
        .repo
        .fetch_project_by_id(project.project_id)
        .unwrap()
        .unwrap();

    let materials: HashSet<_> = loaded
        .materials
        .iter()
        .map(|m| (m.material_name.as_str(), m.num_required, m.cost))
        .collect();
    assert_eq!(
        materials,
        HashSet::from([
            ("Cedar board", Some(6), Some(dec("12.50"))),
            ("Screws", Some(40), Some(dec("0.10"))),
        ])
    );
    assert!(loaded
        .materials
        .iter()
        .all(|m| m.project_id == project.project_id));

    let steps: Vec<_> = loaded.steps.iter().map(|s| s.step_text.as_str()).collect();
    assert_eq!(steps, ["Cut boards", "Assemble", "Fill with soil"]);

    let categories: HashSet<_> = loaded
        .categories
        .iter()
        .map(|c| c.category_name.as_str())
        .collect();
    assert_eq!(categories, HashSet::from(["Garden", "Woodworking"]));
}

#[test]
fn fetch_all_sorts_by_name_and_never_loads_children() {
    let fixture = Fixture::new();
    let shed = fixture.repo.insert_project(new_project("Build shed")).unwrap();
    fixture.repo.insert_project(new_project("Tile backsplash")).unwrap();
    fixture.repo.insert_project(new_project("assemble desk")).unwrap();

    let conn = fixture.conn();
    conn.execute(
        "INSERT INTO step (project_id, step_text, step_order) VALUES (?1, 'Pour slab', 1);",
        [shed.project_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO material (project_id, material_name) VALUES (?1, 'Concrete');",
        [shed.project_id],
    )
    .unwrap();
    drop(conn);

    let projects = fixture.repo.fetch_all_projects().unwrap();
    let names: Vec<_> = projects.iter().map(|p| p.project_name.as_str()).collect();
    assert_eq!(names, ["assemble desk", "Build shed", "Tile backsplash"]);
    assert!(projects.iter().all(|p| !p.has_details()));
}

#[test]
fn fetch_all_on_empty_store_returns_empty_list() {
    let fixture = Fixture::new();
    assert!(fixture.repo.fetch_all_projects().unwrap().is_empty());
}

#[test]
fn update_rewrites_all_fields() {
    let fixture = Fixture::new();
    let mut project = fixture.repo.insert_project(new_project("Draft")).unwrap();

    project.project_name = "Build shed".to_string();
    project.estimated_hours = dec("12");
    project.actual_hours = dec("3.25");
    project.difficulty = 5;
    project.notes = None;
    assert!(fixture.repo.update_project(&project).unwrap());

    let loaded = fixture
        .repo
        .fetch_project_by_id(project.project_id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, project);
}

#[test]
fn update_missing_project_returns_false() {
    let fixture = Fixture::new();
    let ghost: Project = new_project("Ghost").into_project(404);
    assert!(!fixture.repo.update_project(&ghost).unwrap());
    assert!(fixture.repo.fetch_all_projects().unwrap().is_empty());
}

#[test]
fn delete_removes_project_and_its_children() {
    let fixture = Fixture::new();
    let project = fixture.repo.insert_project(new_project("Bookshelf")).unwrap();
    let kept = fixture.repo.insert_project(new_project("Planter")).unwrap();

    let conn = fixture.conn();
    conn.execute(
        "INSERT INTO step (project_id, step_text, step_order) VALUES (?1, 'Sand', 1);",
        [project.project_id],
    )
    .unwrap();
    drop(conn);

    assert!(fixture.repo.delete_project(project.project_id).unwrap());
    assert!(fixture
        .repo
        .fetch_project_by_id(project.project_id)
        .unwrap()
        .is_none());

    let orphan_steps: i64 = fixture
        .conn()
        .query_row(
            "SELECT COUNT(*) FROM step WHERE project_id = ?1;",
            [project.project_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan_steps, 0);

    let remaining = fixture.repo.fetch_all_projects().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].project_id, kept.project_id);
}

#[test]
fn delete_missing_project_returns_false() {
    let fixture = Fixture::new();
    assert!(!fixture.repo.delete_project(7).unwrap());
}

#[test]
fn failed_detail_fetch_rolls_back_and_releases_connection() {
    let fixture = Fixture::new();
    let project = fixture.repo.insert_project(new_project("Workbench")).unwrap();

    fixture.conn().execute_batch("DROP TABLE material;").unwrap();

    let err = fixture
        .repo
        .fetch_project_by_id(project.project_id)
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(std::error::Error::source(&err).is_some());

    // A leaked transaction would hold the database lock and block this write.
    let next = fixture.repo.insert_project(new_project("Sawhorse")).unwrap();
    assert!(next.project_id > project.project_id);
    assert_eq!(fixture.repo.fetch_all_projects().unwrap().len(), 2);
}

#[test]
fn unparseable_stored_hours_surface_as_invalid_data() {
    let fixture = Fixture::new();
    let project = fixture.repo.insert_project(new_project("Deck")).unwrap();

    fixture
        .conn()
        .execute(
            "UPDATE project SET estimated_hours = 'lots' WHERE project_id = ?1;",
            [project.project_id],
        )
        .unwrap();

    let err = fixture.repo.fetch_all_projects().unwrap_err();
    match err {
        RepoError::InvalidData(message) => assert!(message.contains("project.estimated_hours")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejected_update_leaves_project_unchanged() {
    let fixture = Fixture::new();
    let original = fixture.repo.insert_project(new_project("Garage shelves")).unwrap();

    fixture
        .conn()
        .execute_batch(
            "CREATE TRIGGER reject_difficulty BEFORE UPDATE ON project
             WHEN NEW.difficulty > 5
             BEGIN SELECT RAISE(ABORT, 'difficulty out of range'); END;",
        )
        .unwrap();

    let mut edited = original.clone();
    edited.project_name = "Garage shelves v2".to_string();
    edited.difficulty = 9;
    let err = fixture.repo.update_project(&edited).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let loaded = fixture
        .repo
        .fetch_project_by_id(original.project_id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn rejected_delete_keeps_project_and_children() {
    let fixture = Fixture::new();
    let project = fixture.repo.insert_project(new_project("Patio")).unwrap();

    let conn = fixture.conn();
    conn.execute(
        "INSERT INTO step (project_id, step_text, step_order) VALUES (?1, 'Level gravel', 1);",
        [project.project_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO material (project_id, material_name) VALUES (?1, 'Pavers');",
        [project.project_id],
    )
    .unwrap();
    conn.execute_batch(
        "CREATE TRIGGER lock_projects AFTER DELETE ON project
         BEGIN SELECT RAISE(ABORT, 'projects are locked'); END;",
    )
    .unwrap();
    drop(conn);

    let err = fixture.repo.delete_project(project.project_id).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let loaded = fixture
        .repo
        .fetch_project_by_id(project.project_id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.steps.len(), 1);
    assert_eq!(loaded.materials.len(), 1);
    assert_eq!(loaded.project_name, "Patio");
}
