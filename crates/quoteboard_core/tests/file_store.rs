use quoteboard_core::codec::aggregate::aggregate_documents;
use quoteboard_core::{
    encode_quote, FileQuoteRepository, NewQuote, Quote, QuoteRepository, RepoError, SearchType,
};
use std::fs;
use std::path::Path;

#[test]
fn create_assigns_sequential_ids_and_persists_counter() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();

    let ids = ["a", "b", "c"]
        .iter()
        .map(|content| repo.create(&NewQuote::new(*content, "anon")).unwrap().id)
        .collect::<Vec<_>>();

    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(read(&dir.path().join("lastId.txt")), "4");
    assert_eq!(
        read(&dir.path().join("2.json")),
        encode_quote(&Quote::new(2, "b", "anon"))
    );
}

#[test]
fn open_resets_missing_counter_to_one_and_writes_it() {
    let dir = tempfile::tempdir().unwrap();

    let repo = FileQuoteRepository::open(dir.path()).unwrap();

    assert_eq!(repo.next_id(), 1);
    assert_eq!(read(&dir.path().join("lastId.txt")), "1");
}

#[test]
fn open_resets_unparsable_counter() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lastId.txt"), "not a number").unwrap();

    let repo = FileQuoteRepository::open(dir.path()).unwrap();

    assert_eq!(repo.next_id(), 1);
    assert_eq!(read(&dir.path().join("lastId.txt")), "1");
}

#[test]
fn open_without_directory_defers_creation_to_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("db").join("wiseSaying");

    let mut repo = FileQuoteRepository::open(&root).unwrap();
    assert!(!root.exists());
    assert!(repo.find_all().unwrap().is_empty());

    let created = repo.create(&NewQuote::new("first", "me")).unwrap();
    assert_eq!(created.id, 1);
    assert!(root.join("1.json").is_file());
    assert_eq!(read(&root.join("lastId.txt")), "2");
}

#[test]
fn reopen_resumes_from_persisted_counter() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
        repo.create(&NewQuote::new("a", "x")).unwrap();
        repo.create(&NewQuote::new("b", "y")).unwrap();
    }

    let mut reopened = FileQuoteRepository::open(dir.path()).unwrap();
    assert_eq!(reopened.next_id(), 3);
    assert_eq!(reopened.create(&NewQuote::new("c", "z")).unwrap().id, 3);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    for content in ["a", "b", "c"] {
        repo.create(&NewQuote::new(content, "x")).unwrap();
    }

    repo.delete(3).unwrap();
    let created = repo.create(&NewQuote::new("d", "x")).unwrap();

    assert_eq!(created.id, 4);
    assert!(repo.find(3).unwrap().is_none());
}

#[test]
fn find_returns_none_for_absent_and_deleted_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    let created = repo.create(&NewQuote::new("a", "x")).unwrap();

    assert_eq!(repo.find(created.id).unwrap(), Some(created.clone()));
    assert!(repo.find(99).unwrap().is_none());

    repo.delete(created.id).unwrap();
    assert!(repo.find(created.id).unwrap().is_none());
}

#[test]
fn delete_and_update_absent_id_return_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();

    let delete_err = repo.delete(9999).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(9999)));

    let update_err = repo.update(9999, "c", "a").unwrap_err();
    assert!(update_err.is_not_found());
    assert!(!dir.path().join("9999.json").exists());
}

#[test]
fn update_replaces_content_and_author_keeping_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    let created = repo.create(&NewQuote::new("draft", "me")).unwrap();

    repo.update(created.id, "final", "you").unwrap();

    assert_eq!(
        repo.find(created.id).unwrap(),
        Some(Quote::new(created.id, "final", "you"))
    );
    assert_eq!(repo.next_id(), 2);
}

#[test]
fn find_all_ignores_artifact_counter_and_stray_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    repo.create(&NewQuote::new("a", "x")).unwrap();
    repo.create(&NewQuote::new("b", "y")).unwrap();
    repo.build().unwrap();
    fs::write(dir.path().join("notes.txt"), "scratch").unwrap();
    fs::write(dir.path().join("backup.json"), "{}").unwrap();

    let all = repo.find_all().unwrap();

    assert_eq!(
        all,
        vec![Quote::new(1, "a", "x"), Quote::new(2, "b", "y")]
    );
}

#[test]
fn malformed_record_surfaces_as_malformed_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    repo.create(&NewQuote::new("ok", "x")).unwrap();
    fs::write(
        dir.path().join("7.json"),
        "{\n    \"id\": seven,\n    \"content\": \"a\",\n    \"author\": \"b\"\n}",
    )
    .unwrap();

    let find_err = repo.find(7).unwrap_err();
    match find_err {
        RepoError::Malformed { path, .. } => {
            assert_eq!(path.as_deref(), Some(dir.path().join("7.json").as_path()))
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(
        repo.find_all().unwrap_err(),
        RepoError::Malformed { .. }
    ));
}

#[test]
fn failed_record_write_leaves_counter_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("store");
    let mut repo = FileQuoteRepository::open(&root).unwrap();
    fs::write(&root, "not a directory").unwrap();

    let err = repo.create(&NewQuote::new("a", "x")).unwrap_err();

    assert!(matches!(err, RepoError::Io { .. }));
    assert!(err.is_transient());
    assert_eq!(repo.next_id(), 1);
    assert!(root.is_file());
}

#[test]
fn create_refuses_to_overwrite_record_placed_behind_counter() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    let intruder = encode_quote(&Quote::new(1, "kept", "someone"));
    fs::write(dir.path().join("1.json"), &intruder).unwrap();

    let err = repo.create(&NewQuote::new("a", "x")).unwrap_err();

    assert!(matches!(err, RepoError::IdTaken { id: 1, .. }));
    assert!(!err.is_transient());
    assert_eq!(read(&dir.path().join("1.json")), intruder);
    assert_eq!(repo.next_id(), 1);
    assert_eq!(read(&dir.path().join("lastId.txt")), "1");
}

#[test]
fn failed_counter_write_reports_stored_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    fs::remove_file(dir.path().join("lastId.txt")).unwrap();
    fs::create_dir(dir.path().join("lastId.txt")).unwrap();

    let err = repo.create(&NewQuote::new("a", "x")).unwrap_err();

    assert!(matches!(err, RepoError::CounterNotPersisted { id: 1, .. }));
    assert_eq!(repo.find(1).unwrap(), Some(Quote::new(1, "a", "x")));
    assert_eq!(repo.next_id(), 2);
}

#[test]
fn reopen_after_counter_write_failure_keeps_stored_record() {
    let dir = tempfile::tempdir().unwrap();
    let counter = dir.path().join("lastId.txt");
    {
        let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
        fs::remove_file(&counter).unwrap();
        fs::create_dir(&counter).unwrap();
        let err = repo.create(&NewQuote::new("precious", "a")).unwrap_err();
        assert!(matches!(err, RepoError::CounterNotPersisted { id: 1, .. }));
    }
    fs::remove_dir(&counter).unwrap();

    let mut reopened = FileQuoteRepository::open(dir.path()).unwrap();
    assert_eq!(reopened.next_id(), 2);
    assert_eq!(read(&counter), "2");

    let created = reopened.create(&NewQuote::new("new", "b")).unwrap();
    assert_eq!(created.id, 2);
    assert_eq!(
        reopened.find_all().unwrap(),
        vec![Quote::new(1, "precious", "a"), Quote::new(2, "new", "b")]
    );
}

#[test]
fn open_raises_lagging_counter_above_stored_records() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
        for content in ["a", "b", "c"] {
            repo.create(&NewQuote::new(content, "x")).unwrap();
        }
    }
    fs::write(dir.path().join("lastId.txt"), "2").unwrap();

    let mut reopened = FileQuoteRepository::open(dir.path()).unwrap();

    assert_eq!(reopened.next_id(), 4);
    assert_eq!(read(&dir.path().join("lastId.txt")), "4");
    assert_eq!(reopened.create(&NewQuote::new("d", "x")).unwrap().id, 4);
    assert_eq!(reopened.find(3).unwrap(), Some(Quote::new(3, "c", "x")));
}

#[test]
fn create_at_id_limit_fails_without_storing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lastId.txt"), i64::MAX.to_string()).unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    assert_eq!(repo.next_id(), i64::MAX);

    let err = repo.create(&NewQuote::new("a", "x")).unwrap_err();

    assert!(matches!(err, RepoError::IdsExhausted(id) if id == i64::MAX));
    assert!(!dir.path().join(format!("{}.json", i64::MAX)).exists());
    assert!(repo.find_all().unwrap().is_empty());
    assert_eq!(read(&dir.path().join("lastId.txt")), i64::MAX.to_string());
}

#[test]
fn find_all_skips_unreadable_record_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    repo.create(&NewQuote::new("a", "x")).unwrap();
    repo.create(&NewQuote::new("b", "y")).unwrap();
    fs::write(dir.path().join("5.json"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let all = repo.find_all().unwrap();

    assert_eq!(
        all,
        vec![Quote::new(1, "a", "x"), Quote::new(2, "b", "y")]
    );
    assert!(matches!(repo.find(5), Err(RepoError::Io { .. })));
    assert_eq!(repo.find_paged(1).unwrap().max_page, 2);
}

#[test]
fn build_writes_consolidated_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();

    let empty_path = repo.build().unwrap();
    assert_eq!(read(&empty_path), "[\n\n]");

    let quotes = ["a", "b", "c"]
        .iter()
        .map(|content| repo.create(&NewQuote::new(*content, "x")).unwrap())
        .collect::<Vec<_>>();
    let path = repo.build().unwrap();

    let expected = aggregate_documents(&quotes.iter().map(encode_quote).collect::<Vec<_>>());
    assert_eq!(path, dir.path().join("data.json"));
    assert_eq!(read(&path), expected);
    assert_eq!(repo.find_all().unwrap(), quotes);
}

#[test]
fn paged_listing_is_a_growing_descending_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    for index in 1..=45 {
        repo.create(&NewQuote::new(format!("quote {index}"), "anon"))
            .unwrap();
    }

    let first = repo.find_paged(1).unwrap();
    let second = repo.find_paged(2).unwrap();
    let third = repo.find_paged(3).unwrap();

    assert_eq!(first.max_page, 45);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.quotes.len(), 20);
    assert_eq!(first.quotes[0].id, 45);
    assert_eq!(second.quotes.len(), 40);
    assert_eq!(third.quotes.len(), 45);
    assert_eq!(&second.quotes[..20], first.quotes.as_slice());
    assert_eq!(&third.quotes[..40], second.quotes.as_slice());
    assert!(third.quotes.windows(2).all(|pair| pair[0].id > pair[1].id));
}

#[test]
fn search_filters_selected_field_case_sensitively() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileQuoteRepository::open(dir.path()).unwrap();
    repo.create(&NewQuote::new("Rust is fast", "Ferris")).unwrap();
    repo.create(&NewQuote::new("rust never sleeps", "Neil")).unwrap();
    repo.create(&NewQuote::new("100% sure", "Rusty")).unwrap();

    let by_content = repo.search(SearchType::Content, "rust", 1).unwrap();
    assert_eq!(ids(&by_content.quotes), vec![2]);
    assert_eq!(by_content.max_page, 1);

    let by_author = repo.search(SearchType::Author, "Rust", 1).unwrap();
    assert_eq!(ids(&by_author.quotes), vec![3]);

    let literal_percent = repo.search(SearchType::Content, "%", 1).unwrap();
    assert_eq!(ids(&literal_percent.quotes), vec![3]);

    let everything = repo.search(SearchType::Content, "", 1).unwrap();
    assert_eq!(ids(&everything.quotes), vec![3, 2, 1]);
}

#[test]
fn page_zero_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileQuoteRepository::open(dir.path()).unwrap();

    assert!(matches!(repo.find_paged(0), Err(RepoError::InvalidPage(0))));
    assert!(matches!(
        repo.search(SearchType::Author, "x", 0),
        Err(RepoError::InvalidPage(0))
    ));
}

fn ids(quotes: &[Quote]) -> Vec<i64> {
    quotes.iter().map(|quote| quote.id).collect()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
