//! End-to-end subject lookups against the embedded index

mod common;

use chrono::Datelike;
use subject_engine::subjects::*;

#[tokio::test]
async fn test_love_without_details() {
    let engine = SubjectEngine::new(common::loaded_service().await);

    let subject = engine
        .get_subject(&SubjectRequest::new("/subjects/love").with_limit(2))
        .await
        .unwrap();

    assert_eq!(subject.key, "/subjects/love");
    assert_eq!(subject.subject_type, SubjectType::Subject);
    assert_eq!(subject.work_count, 3);
    assert_eq!(subject.works.len(), 2);
    assert_eq!(subject.works[0].key, "/works/OL1W");
    assert_eq!(subject.works[1].key, "/works/OL4W");
    assert_eq!(subject.works[0].ia.as_deref(), Some("symposium00plat"));

    assert!(subject.ebook_count.is_none());
    assert!(subject.authors.is_none());
    assert!(subject.subjects.is_none());
    assert!(subject.publishers.is_none());
    assert!(subject.publishing_history.is_none());
}

#[tokio::test]
async fn test_plato_with_details() {
    let engine = SubjectEngine::new(common::loaded_service().await);

    let subject = engine
        .get_subject(&SubjectRequest::new("/subjects/person:plato").with_details(true))
        .await
        .unwrap();

    assert_eq!(subject.subject_type, SubjectType::Person);
    assert_eq!(subject.work_count, 3);
    assert_eq!(subject.name, "Plato");
    assert_eq!(subject.ebook_count, Some(2));

    let authors = subject.authors.unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].key, "/authors/OL12823A");
    assert_eq!(authors[0].name, "Plato");
    assert_eq!(authors[0].count, 3);

    let mut publishers: Vec<_> = subject
        .publishers
        .unwrap()
        .into_iter()
        .map(|p| (p.key, p.count))
        .collect();
    publishers.sort();
    assert_eq!(
        publishers,
        vec![
            ("/publishers/Hackett".to_string(), 2),
            ("/publishers/Penguin_Books".to_string(), 2),
        ]
    );

    // Plato removed from his own people list
    let people = subject.people.unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].key, "/subjects/person:socrates");

    // 999 and 2500 are out of range
    assert_eq!(
        subject.publishing_history,
        Some(vec![(1951, 1), (1973, 1), (1992, 1), (1999, 1)])
    );

    let places = subject.places.unwrap();
    assert_eq!(places[0].key, "/subjects/place:athens");
    assert_eq!(places[0].count, 2);

    let languages = subject.languages.unwrap();
    assert_eq!(languages[0].name, "eng");
}

#[tokio::test]
async fn test_publishing_history_includes_next_year() {
    let service = common::loaded_service().await;
    let next_year = chrono::Utc::now().year() + 1;
    service
        .index_work(&subject_engine::search::WorkDocument {
            subject: vec!["Futurism".to_string()],
            publish_year: vec![next_year, next_year + 1],
            ..subject_engine::search::WorkDocument::new("/works/OL9W", "Tomorrow")
        })
        .await
        .unwrap();

    let engine = SubjectEngine::new(service);
    let subject = engine
        .get_subject(&SubjectRequest::new("/subjects/futurism").with_details(true))
        .await
        .unwrap();

    assert_eq!(subject.publishing_history, Some(vec![(next_year, 1)]));
}

#[tokio::test]
async fn test_filters() {
    let engine = SubjectEngine::new(common::loaded_service().await);

    let fulltext = engine
        .get_subject(&SubjectRequest::new("/subjects/love").with_filters(SubjectFilters {
            has_fulltext: true,
            publish_year: PublishYearFilter::NoFilter,
        }))
        .await
        .unwrap();
    assert_eq!(fulltext.work_count, 1);
    assert_eq!(fulltext.works[0].title, "Symposium");

    let ranged = engine
        .get_subject(&SubjectRequest::new("/subjects/love").with_filters(SubjectFilters {
            has_fulltext: false,
            publish_year: PublishYearFilter::parse("1970-1990"),
        }))
        .await
        .unwrap();
    let mut titles: Vec<_> = ranged.works.into_iter().map(|w| w.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["Love in the Time of Cholera", "Phaedrus"]);

    // a malformed range is dropped, not rejected
    let unfiltered = engine
        .get_subject(&SubjectRequest::new("/subjects/love").with_filters(SubjectFilters {
            has_fulltext: false,
            publish_year: PublishYearFilter::parse("1970-abc"),
        }))
        .await
        .unwrap();
    assert_eq!(unfiltered.work_count, 3);
}

#[tokio::test]
async fn test_sort_and_offset() {
    let engine = SubjectEngine::new(common::loaded_service().await);

    let newest = engine
        .get_subject(&SubjectRequest::new("/subjects/love").with_sort(SortOption::New))
        .await
        .unwrap();
    let keys: Vec<_> = newest.works.iter().map(|w| w.key.as_str()).collect();
    assert_eq!(keys, vec!["/works/OL4W", "/works/OL2W", "/works/OL1W"]);

    let second_page = engine
        .get_subject(&SubjectRequest::new("/subjects/love").with_offset(1).with_limit(1))
        .await
        .unwrap();
    assert_eq!(second_page.work_count, 3);
    assert_eq!(second_page.works.len(), 1);
    assert_eq!(second_page.works[0].key, "/works/OL4W");
}

#[tokio::test]
async fn test_unknown_subject_is_none() {
    let engine = SubjectEngine::new(common::loaded_service().await);
    assert!(engine
        .get_subject(&SubjectRequest::new("/subjects/no_such_subject"))
        .await
        .is_none());
}

#[tokio::test]
async fn test_unknown_prefix_uses_generic_facet() {
    let engine = SubjectEngine::new(common::loaded_service().await);

    let subject = engine
        .get_subject(&SubjectRequest::new("/topics/love"))
        .await
        .unwrap();
    assert_eq!(subject.subject_type, SubjectType::Subject);
    assert_eq!(subject.work_count, 3);
}

#[tokio::test]
async fn test_time_and_place_subjects() {
    let engine = SubjectEngine::new(common::loaded_service().await);

    let time = engine
        .get_subject(&SubjectRequest::new("/subjects/time:4th_century_bc"))
        .await
        .unwrap();
    assert_eq!(time.subject_type, SubjectType::Time);
    assert_eq!(time.works[0].title, "Anabasis");

    let place = engine
        .get_subject(&SubjectRequest::new("/subjects/place:athens").with_details(true))
        .await
        .unwrap();
    assert_eq!(place.work_count, 2);
    assert_eq!(place.name, "Athens");
    assert!(place.places.unwrap().is_empty());
}

#[tokio::test]
async fn test_display_name_round_trip() {
    for work in common::corpus() {
        for name in work.subject.iter().chain(work.person.iter()) {
            let key = normalize_path(name);
            assert_eq!(normalize_path(&key), key);
            assert_eq!(normalize_path(&key.replace('_', " ")), key);
        }
    }
}
