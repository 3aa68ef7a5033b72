#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::super::scope::SearchScope;
    use crate::config::SessionConfig;

    #[test]
    fn test_all_expands_to_every_concrete_scope_in_order() {
        assert_eq!(
            SearchScope::All.expand(),
            vec![
                SearchScope::Movies,
                SearchScope::Music,
                SearchScope::Apps,
                SearchScope::Books
            ]
        );
        assert_eq!(SearchScope::Music.expand(), vec![SearchScope::Music]);
    }

    #[test]
    fn test_media_tags_round_trip() {
        assert_eq!(SearchScope::All.media_tag(), None);
        for scope in SearchScope::CONCRETE {
            let tag = scope.media_tag().unwrap();
            assert_eq!(SearchScope::from_media_tag(tag), Some(scope));
        }
        assert_eq!(SearchScope::from_media_tag("podcast"), None);
    }

    #[test]
    fn test_scope_admits() {
        assert!(SearchScope::All.admits(SearchScope::Books));
        assert!(SearchScope::Books.admits(SearchScope::Books));
        assert!(!SearchScope::Books.admits(SearchScope::Music));
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("Music".parse::<SearchScope>(), Ok(SearchScope::Music));
        assert_eq!("software".parse::<SearchScope>(), Ok(SearchScope::Apps));
        assert_eq!(" all ".parse::<SearchScope>(), Ok(SearchScope::All));
        assert!("podcasts".parse::<SearchScope>().is_err());
    }

    #[test]
    fn test_query_equality_is_by_value() {
        let a = SearchQuery::new("abc", SearchScope::All);
        let b = SearchQuery::new("abc".to_string(), SearchScope::All);
        assert_eq!(a, b);
        assert_ne!(a, SearchQuery::new("abc", SearchScope::Apps));
    }

    #[test]
    fn test_whitespace_query_is_empty() {
        assert!(SearchQuery::new("", SearchScope::All).is_empty());
        assert!(SearchQuery::new("   ", SearchScope::Music).is_empty());
        assert!(!SearchQuery::new(" a ", SearchScope::Music).is_empty());
    }

    #[test]
    fn test_request_params_for_fan_out() {
        let config = SessionConfig::default();
        let query = SearchQuery::new(" jack ", SearchScope::All);

        let params = RequestParams::for_scope(&query, SearchScope::Music, &config);

        assert_eq!(params.term(), Some("jack"));
        assert_eq!(params.media(), Some("music"));
        assert_eq!(params.lang(), Some("en_us"));
        assert_eq!(params.limit(), Some(50));
    }

    #[test]
    fn test_request_params_for_single_scope() {
        let config = SessionConfig::default();
        let query = SearchQuery::new("jack", SearchScope::Books);

        let params = RequestParams::for_scope(&query, SearchScope::Books, &config);

        assert_eq!(params.media(), Some("ebook"));
        assert_eq!(params.limit(), Some(20));
    }

    #[test]
    fn test_store_item_identity_ordering() {
        let a = StoreItem::new(1, "Zeta", "song");
        let b = StoreItem::new(2, "Alpha", "song");
        assert!(a < b);
        assert_eq!(a.clone(), a);
        assert_eq!(a.display_name(), "Zeta");
    }
}
