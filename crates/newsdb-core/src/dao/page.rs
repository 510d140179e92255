//! Page and page group accessor

use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{count_rows, NewsDatabase};
use crate::models::{Page, PageGroup, TOP_LEVEL_PAGE_PARENT_ID};
use crate::storage::converters::{read_column, ColumnConverter, IntListConverter};
use crate::storage::schema::{PAGES, PAGE_GROUPS};
use crate::storage::StorageResult;

const SELECT_PAGES: &str =
    "SELECT id, newspaper_id, parent_page_id, name, has_child, has_data FROM pages";

/// Read-facing access to the `pages` and `page_groups` tables
pub struct PageFrontEndDao<'a> {
    db: &'a NewsDatabase,
}

impl<'a> PageFrontEndDao<'a> {
    pub(crate) fn new(db: &'a NewsDatabase) -> Self {
        Self { db }
    }

    // ==================== Pages ====================

    pub fn find_by_id(&self, id: i64) -> StorageResult<Option<Page>> {
        self.db.with_conn(|conn| find_page(conn, id))
    }

    /// Top-level pages of a newspaper, by id
    pub fn find_top_pages(&self, newspaper_id: i64) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!(
                "{} WHERE newspaper_id = ?1 AND parent_page_id = ?2 ORDER BY id",
                SELECT_PAGES
            ),
            [newspaper_id, TOP_LEVEL_PAGE_PARENT_ID],
        )
    }

    /// Child pages of a top-level page, by id
    pub fn find_child_pages(&self, top_page_id: i64) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!("{} WHERE parent_page_id = ?1 ORDER BY id", SELECT_PAGES),
            [top_page_id],
        )
    }

    pub fn count(&self) -> StorageResult<i64> {
        self.db.with_conn(|conn| count_rows(conn, PAGES.name))
    }

    /// Insert or update pages, returns the number written
    pub fn add_pages(&self, pages: &[Page]) -> StorageResult<usize> {
        self.db.with_transaction(|tx| Ok(insert_pages(tx, pages)?))
    }

    // ==================== Page Groups ====================

    /// All page groups, by name
    pub fn find_all_page_groups(&self) -> StorageResult<Vec<PageGroup>> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT name, active, page_list FROM page_groups ORDER BY name")?;
            let groups = stmt
                .query_map([], row_to_page_group)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(groups)
        })
    }

    pub fn find_page_group(&self, name: &str) -> StorageResult<Option<PageGroup>> {
        self.db.with_conn(|conn| find_group(conn, name))
    }

    /// Resolve the pages of a group, in the group's order
    ///
    /// Ids that no longer match a stored page are skipped. An unknown group
    /// yields an empty list.
    pub fn find_pages_for_group(&self, name: &str) -> StorageResult<Vec<Page>> {
        self.db.with_conn(|conn| {
            let Some(group) = find_group(conn, name)? else {
                return Ok(Vec::new());
            };

            let mut pages = Vec::with_capacity(group.page_list.len());
            for page_id in group.page_list {
                if let Some(page) = find_page(conn, page_id)? {
                    pages.push(page);
                }
            }
            Ok(pages)
        })
    }

    pub fn page_group_count(&self) -> StorageResult<i64> {
        self.db.with_conn(|conn| count_rows(conn, PAGE_GROUPS.name))
    }

    /// Insert or update page groups, returns the number written
    pub fn add_page_groups(&self, groups: &[PageGroup]) -> StorageResult<usize> {
        self.db
            .with_transaction(|tx| Ok(insert_page_groups(tx, groups)?))
    }

    fn query_pages<P: rusqlite::Params>(&self, sql: &str, params: P) -> StorageResult<Vec<Page>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let pages = stmt
                .query_map(params, row_to_page)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(pages)
        })
    }
}

fn find_page(conn: &Connection, id: i64) -> rusqlite::Result<Option<Page>> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SELECT_PAGES),
        params![id],
        row_to_page,
    )
    .optional()
}

fn find_group(conn: &Connection, name: &str) -> rusqlite::Result<Option<PageGroup>> {
    conn.query_row(
        "SELECT name, active, page_list FROM page_groups WHERE name = ?1",
        params![name],
        row_to_page_group,
    )
    .optional()
}

pub(crate) fn insert_pages(conn: &Connection, pages: &[Page]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO pages (id, newspaper_id, parent_page_id, name, has_child, has_data)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            newspaper_id = excluded.newspaper_id,
            parent_page_id = excluded.parent_page_id,
            name = excluded.name,
            has_child = excluded.has_child,
            has_data = excluded.has_data
        "#,
    )?;
    for page in pages {
        stmt.execute(params![
            page.id,
            page.newspaper_id,
            page.parent_page_id,
            page.name,
            page.has_child,
            page.has_data
        ])?;
    }
    Ok(pages.len())
}

pub(crate) fn insert_page_groups(
    conn: &Connection,
    groups: &[PageGroup],
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO page_groups (name, active, page_list)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(name) DO UPDATE SET
            active = excluded.active,
            page_list = excluded.page_list
        "#,
    )?;
    for group in groups {
        stmt.execute(params![
            group.name,
            group.active,
            IntListConverter::encode(&group.page_list)
        ])?;
    }
    Ok(groups.len())
}

// `active` and `link_format` are not persisted and keep their defaults
fn row_to_page(row: &rusqlite::Row) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        newspaper_id: row.get(1)?,
        parent_page_id: row.get(2)?,
        name: row.get(3)?,
        has_child: row.get(4)?,
        has_data: row.get(5)?,
        ..Page::default()
    })
}

fn row_to_page_group(row: &rusqlite::Row) -> rusqlite::Result<PageGroup> {
    Ok(PageGroup {
        name: row.get(0)?,
        active: row.get(1)?,
        page_list: read_column::<IntListConverter>(row, 2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, Language, Newspaper};

    fn seeded_db() -> NewsDatabase {
        let db = NewsDatabase::open_in_memory().unwrap();
        db.country_dao()
            .add_countries(&[Country::new(1, "Bangladesh", "BD", "Asia/Dhaka")])
            .unwrap();
        db.language_dao()
            .add_languages(&[Language::new(1, "Bangla")])
            .unwrap();
        db.newspaper_dao()
            .add_newspapers(&[
                Newspaper::new(1, "Prothom Alo", 1, 1, true),
                Newspaper::new(2, "Kaler Kantho", 1, 1, true),
            ])
            .unwrap();

        let mut home = Page::new(10, 1, TOP_LEVEL_PAGE_PARENT_ID, "Home");
        home.has_child = true;
        let mut sports = Page::new(12, 1, 10, "Sports");
        sports.has_data = true;
        let mut politics = Page::new(11, 1, 10, "Politics");
        politics.has_data = true;
        let editorial = Page::new(20, 1, TOP_LEVEL_PAGE_PARENT_ID, "Editorial");
        let other = Page::new(30, 2, TOP_LEVEL_PAGE_PARENT_ID, "Front");

        db.page_dao()
            .add_pages(&[home, sports, politics, editorial, other])
            .unwrap();
        db
    }

    fn ids(pages: &[Page]) -> Vec<i64> {
        pages.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_find_top_pages() {
        let db = seeded_db();
        let top = db.page_dao().find_top_pages(1).unwrap();
        assert_eq!(ids(&top), vec![10, 20]);
        assert!(top[0].has_child);
        assert!(!top[1].has_child);
    }

    #[test]
    fn test_find_child_pages() {
        let db = seeded_db();
        let children = db.page_dao().find_child_pages(10).unwrap();
        assert_eq!(ids(&children), vec![11, 12]);
        assert!(children.iter().all(|p| p.has_data));
        assert!(db.page_dao().find_child_pages(20).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let db = seeded_db();
        let page = db.page_dao().find_by_id(12).unwrap().unwrap();
        assert_eq!(page.name, "Sports");
        assert_eq!(page.parent_page_id, 10);
        assert!(page.link_format.is_none());
        assert!(db.page_dao().find_by_id(99).unwrap().is_none());
        assert_eq!(db.page_dao().count().unwrap(), 5);
    }

    #[test]
    fn test_page_for_unknown_newspaper_is_rejected() {
        let db = seeded_db();
        let result = db
            .page_dao()
            .add_pages(&[Page::new(99, 42, TOP_LEVEL_PAGE_PARENT_ID, "Orphan")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_page_groups() {
        let db = seeded_db();
        let dao = db.page_dao();

        dao.add_page_groups(&[
            PageGroup::new("Top Stories", true, vec![30, 12, 10]),
            PageGroup::new("Archive", false, Vec::new()),
        ])
        .unwrap();

        assert_eq!(dao.page_group_count().unwrap(), 2);

        let groups = dao.find_all_page_groups().unwrap();
        assert_eq!(groups[0].name, "Archive");
        assert!(groups[0].page_list.is_empty());

        let top = dao.find_page_group("Top Stories").unwrap().unwrap();
        assert_eq!(top.page_list, vec![30, 12, 10]);
        assert!(top.active);
    }

    #[test]
    fn test_find_pages_for_group_keeps_order() {
        let db = seeded_db();
        let dao = db.page_dao();

        dao.add_page_groups(&[PageGroup::new("Mixed", true, vec![30, 777, 11])])
            .unwrap();

        let pages = dao.find_pages_for_group("Mixed").unwrap();
        assert_eq!(ids(&pages), vec![30, 11]);
        assert!(dao.find_pages_for_group("Unknown").unwrap().is_empty());
    }

    #[test]
    fn test_reloading_page_keeps_children() {
        let db = seeded_db();
        let dao = db.page_dao();

        let mut renamed = Page::new(10, 1, TOP_LEVEL_PAGE_PARENT_ID, "Homepage");
        renamed.has_child = true;
        dao.add_pages(&[renamed]).unwrap();

        assert_eq!(dao.find_by_id(10).unwrap().unwrap().name, "Homepage");
        assert_eq!(dao.find_child_pages(10).unwrap().len(), 2);
    }
}
