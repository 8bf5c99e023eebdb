//! Pipeline tests: parse, commit, and the path between them

#[cfg(test)]
mod tests {
    use crate::pdf::fixtures::build_pdf;
    use crate::{
        CommitError, CommitRequest, CompoundCandidate, IngestConfig, IngestContext, IngestError,
        Ingestor, ItemKind, LocalDocumentStorage, Normalizer, PaperCandidate,
        SynthesisRouteCandidate, TITLE_SENTINEL,
    };
    use retort_domain::{
        Compound, CompoundId, EntityStore, Paper, PaperId, PaperQuery, SynthesisRoute,
        SynthesisRouteId,
    };
    use retort_llm::MockProvider;
    use retort_store::SqliteStore;
    use std::collections::HashSet;
    use std::fmt;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Store wrapper that fails selected writes
    struct FlakyStore {
        inner: SqliteStore,
        failing_compounds: HashSet<String>,
        fail_route_links: bool,
        fail_paper_links: bool,
        fail_papers: bool,
        /// Compound and route inserts that reached the store
        entity_writes: usize,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: SqliteStore::in_memory().unwrap(),
                failing_compounds: HashSet::new(),
                fail_route_links: false,
                fail_paper_links: false,
                fail_papers: false,
                entity_writes: 0,
            }
        }

        fn failing_on(names: &[&str]) -> Self {
            let mut store = Self::new();
            store.failing_compounds = names.iter().map(|n| n.to_string()).collect();
            store
        }
    }

    #[derive(Debug)]
    struct FlakyError(String);

    impl fmt::Display for FlakyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<retort_store::StoreError> for FlakyError {
        fn from(e: retort_store::StoreError) -> Self {
            FlakyError(e.to_string())
        }
    }

    impl EntityStore for FlakyStore {
        type Error = FlakyError;

        fn create_paper(&mut self, paper: Paper) -> Result<PaperId, Self::Error> {
            if self.fail_papers {
                return Err(FlakyError("disk full".to_string()));
            }
            Ok(self.inner.create_paper(paper)?)
        }

        fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, Self::Error> {
            Ok(self.inner.get_paper(id)?)
        }

        fn set_paper_compounds(
            &mut self,
            id: PaperId,
            compounds: &[CompoundId],
        ) -> Result<(), Self::Error> {
            if self.fail_paper_links {
                return Err(FlakyError("paper update refused".to_string()));
            }
            Ok(self.inner.set_paper_compounds(id, compounds)?)
        }

        fn list_papers(&self, query: &PaperQuery) -> Result<Vec<Paper>, Self::Error> {
            Ok(self.inner.list_papers(query)?)
        }

        fn count_papers(&self, query: &PaperQuery) -> Result<usize, Self::Error> {
            Ok(self.inner.count_papers(query)?)
        }

        fn create_compound(&mut self, compound: Compound) -> Result<CompoundId, Self::Error> {
            if self.failing_compounds.contains(&compound.name) {
                return Err(FlakyError(format!("refused compound {}", compound.name)));
            }
            self.entity_writes += 1;
            Ok(self.inner.create_compound(compound)?)
        }

        fn get_compound(&self, id: CompoundId) -> Result<Option<Compound>, Self::Error> {
            Ok(self.inner.get_compound(id)?)
        }

        fn set_compound_route(
            &mut self,
            id: CompoundId,
            route: SynthesisRouteId,
        ) -> Result<(), Self::Error> {
            if self.fail_route_links {
                return Err(FlakyError("compound update refused".to_string()));
            }
            Ok(self.inner.set_compound_route(id, route)?)
        }

        fn create_synthesis_route(
            &mut self,
            route: SynthesisRoute,
        ) -> Result<SynthesisRouteId, Self::Error> {
            self.entity_writes += 1;
            Ok(self.inner.create_synthesis_route(route)?)
        }

        fn get_synthesis_route(
            &self,
            id: SynthesisRouteId,
        ) -> Result<Option<SynthesisRoute>, Self::Error> {
            Ok(self.inner.get_synthesis_route(id)?)
        }
    }

    fn ingestor_with<S>(
        provider: MockProvider,
        store: S,
        config: IngestConfig,
    ) -> (Ingestor<MockProvider, S, LocalDocumentStorage>, TempDir)
    where
        S: EntityStore,
        S::Error: fmt::Display,
    {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(
            provider,
            store,
            LocalDocumentStorage::new(dir.path().join("papers")),
            config,
        )
        .unwrap()
        .with_normalizer(Normalizer::with_year(2024));
        (ingestor, dir)
    }

    fn ingestor(
        provider: MockProvider,
    ) -> (Ingestor<MockProvider, SqliteStore, LocalDocumentStorage>, TempDir) {
        ingestor_with(provider, SqliteStore::in_memory().unwrap(), IngestConfig::default())
    }

    fn paper(title: &str) -> PaperCandidate {
        PaperCandidate {
            title: title.to_string(),
            year: 2022,
            ..Default::default()
        }
    }

    fn compound(name: &str) -> CompoundCandidate {
        CompoundCandidate {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn route(name: &str) -> SynthesisRouteCandidate {
        SynthesisRouteCandidate {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn request(
        title: &str,
        compounds: &[&str],
        routes: &[&str],
    ) -> CommitRequest {
        CommitRequest {
            paper_candidate: paper(title),
            compound_candidates: compounds.iter().map(|n| compound(n)).collect(),
            synthesis_route_candidates: routes.iter().map(|n| route(n)).collect(),
            stored_document_path: "uploads/papers/paper-test.pdf".to_string(),
        }
    }

    const EXTRACTION_REPLY: &str = r#"Here is the extracted data:
```json
{
  "paper": {
    "title": "One-pot synthesis of quinazolinones",
    "authors": ["A. Chemist"],
    "abstract": "2-Aminobenzamide reacts with formic acid.",
    "journal": "J. Heterocycl. Chem.",
    "year": 2021,
    "keywords": ["quinazolinone", "cyclization"]
  },
  "compounds": [
    {
      "name": "2-Aminobenzamide",
      "category": "Benzamide",
      "description": "Starting material",
      "possibleSMILES": "NC(=O)c1ccccc1N"
    }
  ],
  "synthesisRoutes": [
    {
      "name": "Synthesis of 2-Aminobenzamide derivative",
      "steps": [
        {
          "stepNumber": 1,
          "from": "2-Aminobenzamide",
          "to": "Quinazolin-4(3H)-one",
          "reagent": "Formic Acid",
          "conditions": "reflux",
          "description": "Cyclocondensation"
        }
      ]
    }
  ]
}
```"#;

    fn three_page_pdf() -> Vec<u8> {
        build_pdf(&[
            Some("Quinazolinones from 2-Aminobenzamide"),
            Some("2-Aminobenzamide was heated with Formic Acid"),
            Some("The product was recrystallized"),
        ])
    }

    #[tokio::test]
    async fn test_end_to_end_parse_then_commit() {
        let (ingestor, _dir) = ingestor(MockProvider::new(EXTRACTION_REPLY));
        let ctx = IngestContext::for_contributor("user-1");

        let parsed = ingestor
            .parse(&ctx, "quinazolinones.pdf", three_page_pdf())
            .await
            .unwrap();

        assert_eq!(parsed.page_count, 3);
        assert!(parsed.extracted_text_preview.contains("Formic Acid"));
        assert!(parsed.extraction_warning.is_none());
        assert!(std::path::Path::new(&parsed.stored_document_path).exists());
        assert_eq!(parsed.compound_candidates.len(), 1);
        assert_eq!(parsed.compound_candidates[0].possible_smiles, "NC(=O)c1ccccc1N");

        // Parse wrote no entities
        let store = ingestor.store();
        assert_eq!(store.lock().unwrap().count_papers(&PaperQuery::default()).unwrap(), 0);

        let outcome = ingestor.commit(&ctx, parsed.clone().into()).unwrap();
        assert_eq!(outcome.compounds_created, 1);
        assert_eq!(outcome.synthesis_created, 1);
        assert!(outcome.failures.is_empty());
        assert!(outcome.warnings.is_empty());

        let store = store.lock().unwrap();
        let paper = store.get_paper(outcome.paper_id).unwrap().unwrap();
        assert_eq!(paper.pdf_url, parsed.stored_document_path);
        assert_eq!(paper.contributor.as_deref(), Some("user-1"));
        assert_eq!(paper.tags, vec!["quinazolinone", "cyclization"]);
        assert_eq!(paper.related_compounds.len(), 1);

        let compound = store.get_compound(paper.related_compounds[0]).unwrap().unwrap();
        assert_eq!(compound.name, "2-Aminobenzamide");
        assert_eq!(compound.related_papers, vec![paper.id]);

        let route_id = compound.synthesis_route.expect("compound should reference its route");
        let route = store.get_synthesis_route(route_id).unwrap().unwrap();
        assert_eq!(route.id, route_id);
        assert_eq!(route.compound_id, compound.id);
        assert_eq!(route.created_by.as_deref(), Some("user-1"));
        assert_eq!(route.notes, "Extracted from uploaded paper");
        assert_eq!(route.steps[0].reagent, "Formic Acid");
    }

    #[tokio::test]
    async fn test_parse_survives_ai_failure() {
        let (ingestor, _dir) = ingestor(MockProvider::failing("upstream 503"));
        let parsed = ingestor
            .parse(&IngestContext::default(), "paper.pdf", three_page_pdf())
            .await
            .unwrap();

        assert_eq!(parsed.paper_candidate.title, TITLE_SENTINEL);
        assert_eq!(parsed.paper_candidate.year, 2024);
        assert!(parsed.compound_candidates.is_empty());
        assert!(parsed.synthesis_route_candidates.is_empty());
        assert!(parsed.extraction_warning.is_some());
        assert_eq!(parsed.page_count, 3);
    }

    #[tokio::test]
    async fn test_fallback_year_is_taken_per_parse() {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(
            MockProvider::failing("upstream 503"),
            SqliteStore::in_memory().unwrap(),
            LocalDocumentStorage::new(dir.path().join("papers")),
            IngestConfig::default(),
        )
        .unwrap();

        let parsed = ingestor
            .parse(&IngestContext::default(), "paper.pdf", three_page_pdf())
            .await
            .unwrap();
        assert_eq!(parsed.paper_candidate.year, Normalizer::new().current_year());
    }

    #[tokio::test]
    async fn test_parse_survives_ai_timeout() {
        let config = IngestConfig {
            ai_timeout_secs: 1,
            ..Default::default()
        };
        let provider = MockProvider::new(EXTRACTION_REPLY).with_delay(Duration::from_secs(30));
        let (ingestor, _dir) =
            ingestor_with(provider, SqliteStore::in_memory().unwrap(), config);

        let parsed = ingestor
            .parse(&IngestContext::default(), "paper.pdf", three_page_pdf())
            .await
            .unwrap();

        assert_eq!(parsed.paper_candidate.title, TITLE_SENTINEL);
        assert!(parsed.compound_candidates.is_empty());
        assert!(parsed.extraction_warning.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_parse_survives_garbage_reply() {
        let (ingestor, _dir) = ingestor(MockProvider::new("no json here"));
        let parsed = ingestor
            .parse(&IngestContext::default(), "paper.pdf", three_page_pdf())
            .await
            .unwrap();

        assert_eq!(parsed.paper_candidate.title, TITLE_SENTINEL);
        assert!(parsed.synthesis_route_candidates.is_empty());
    }

    #[tokio::test]
    async fn test_parse_rejects_empty_and_oversized_input() {
        let config = IngestConfig {
            max_upload_bytes: 16,
            ..Default::default()
        };
        let provider = MockProvider::new("{}");
        let shared = provider.clone();
        let (ingestor, _dir) =
            ingestor_with(provider, SqliteStore::in_memory().unwrap(), config);
        let ctx = IngestContext::default();

        assert!(matches!(
            ingestor.parse(&ctx, "empty.pdf", Vec::new()).await,
            Err(IngestError::InputValidation(_))
        ));
        assert!(matches!(
            ingestor.parse(&ctx, "big.pdf", vec![b'x'; 17]).await,
            Err(IngestError::TooLarge { size: 17, limit: 16 })
        ));
        assert_eq!(shared.call_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_rejects_non_pdf_without_storing() {
        let provider = MockProvider::new("{}");
        let shared = provider.clone();
        let (ingestor, dir) = ingestor(provider);

        let result = ingestor
            .parse(&IngestContext::default(), "notes.pdf", b"plain text".to_vec())
            .await;

        assert!(matches!(result, Err(IngestError::Parse(_))));
        assert_eq!(shared.call_count(), 0);
        assert!(!dir.path().join("papers").exists());
    }

    #[tokio::test]
    async fn test_preview_is_bounded() {
        let config = IngestConfig {
            preview_chars: 10,
            ..Default::default()
        };
        let (ingestor, _dir) = ingestor_with(
            MockProvider::new("{}"),
            SqliteStore::in_memory().unwrap(),
            config,
        );
        let parsed = ingestor
            .parse(&IngestContext::default(), "paper.pdf", three_page_pdf())
            .await
            .unwrap();
        assert_eq!(parsed.extracted_text_preview.chars().count(), 10);
    }

    #[test]
    fn test_commit_with_partial_compound_failures() {
        let store = FlakyStore::failing_on(&["Bad one", "Bad two"]);
        let (ingestor, _dir) =
            ingestor_with(MockProvider::default(), store, IngestConfig::default());

        let outcome = ingestor
            .commit(
                &IngestContext::default(),
                request("Paper", &["Good A", "Bad one", "Good B", "Bad two", "Good C"], &[]),
            )
            .unwrap();

        assert_eq!(outcome.compounds_created, 3);
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures.iter().all(|f| f.kind == ItemKind::Compound));
        assert_eq!(outcome.paper.related_compounds.len(), 3);

        let store = ingestor.store();
        let store = store.lock().unwrap();
        let paper = store.get_paper(outcome.paper_id).unwrap().unwrap();
        let names: Vec<String> = store
            .get_compounds(&paper.related_compounds)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Good A", "Good B", "Good C"]);
    }

    #[test]
    fn test_commit_empty_compound_name_is_item_failure() {
        let (ingestor, _dir) = ingestor(MockProvider::default());
        let outcome = ingestor
            .commit(&IngestContext::default(), request("Paper", &["", "Named"], &[]))
            .unwrap();

        assert_eq!(outcome.compounds_created, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].reason.contains("name"));
    }

    #[test]
    fn test_commit_empty_title_is_fatal() {
        let (ingestor, _dir) = ingestor(MockProvider::default());
        let result = ingestor.commit(&IngestContext::default(), request("  ", &["A"], &[]));
        assert!(matches!(result, Err(CommitError::InvalidPaper(_))));

        let store = ingestor.store();
        assert_eq!(store.lock().unwrap().count_papers(&PaperQuery::default()).unwrap(), 0);
    }

    #[test]
    fn test_paper_store_failure_aborts_commit() {
        let mut store = FlakyStore::new();
        store.fail_papers = true;
        let (ingestor, _dir) = ingestor_with(MockProvider::default(), store, IngestConfig::default());

        let result = ingestor.commit(
            &IngestContext::for_contributor("chemist-1"),
            request("Paper", &["A", "B"], &["Synthesis of A"]),
        );
        match result {
            Err(CommitError::PersistenceFatal(reason)) => assert!(reason.contains("disk full")),
            other => panic!("expected PersistenceFatal, got {:?}", other),
        }

        let store = ingestor.store();
        let store = store.lock().unwrap();
        assert_eq!(store.entity_writes, 0);
        assert_eq!(store.inner.count_papers(&PaperQuery::default()).unwrap(), 0);
    }

    #[test]
    fn test_route_links_to_named_compound() {
        let (ingestor, _dir) = ingestor(MockProvider::default());
        let outcome = ingestor
            .commit(
                &IngestContext::default(),
                request("Paper", &["Compound A", "Compound B"], &["Synthesis of Compound B"]),
            )
            .unwrap();
        assert_eq!(outcome.synthesis_created, 1);

        let store = ingestor.store();
        let store = store.lock().unwrap();
        let paper = store.get_paper(outcome.paper_id).unwrap().unwrap();
        let compounds = store.get_compounds(&paper.related_compounds).unwrap();

        assert!(compounds[0].synthesis_route.is_none());
        let route_id = compounds[1].synthesis_route.unwrap();
        let route = store.get_synthesis_route(route_id).unwrap().unwrap();
        assert_eq!(route.compound_id, compounds[1].id);
    }

    #[test]
    fn test_route_falls_back_to_first_compound() {
        let (ingestor, _dir) = ingestor(MockProvider::default());
        let outcome = ingestor
            .commit(
                &IngestContext::default(),
                request("Paper", &["X", "Y"], &["Unrelated Route Name"]),
            )
            .unwrap();
        assert_eq!(outcome.synthesis_created, 1);

        let store = ingestor.store();
        let store = store.lock().unwrap();
        let paper = store.get_paper(outcome.paper_id).unwrap().unwrap();
        let compounds = store.get_compounds(&paper.related_compounds).unwrap();
        assert_eq!(compounds[0].name, "X");
        assert!(compounds[0].synthesis_route.is_some());
        assert!(compounds[1].synthesis_route.is_none());
    }

    #[test]
    fn test_route_without_compounds_is_skipped() {
        let (ingestor, _dir) = ingestor(MockProvider::default());
        let outcome = ingestor
            .commit(&IngestContext::default(), request("Paper", &[], &["Lonely route"]))
            .unwrap();

        assert_eq!(outcome.compounds_created, 0);
        assert_eq!(outcome.synthesis_created, 0);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, ItemKind::SynthesisRoute);
    }

    #[test]
    fn test_routes_only_attach_to_created_compounds() {
        let store = FlakyStore::failing_on(&["Compound B"]);
        let (ingestor, _dir) =
            ingestor_with(MockProvider::default(), store, IngestConfig::default());

        let outcome = ingestor
            .commit(
                &IngestContext::default(),
                request("Paper", &["Compound A", "Compound B"], &["Synthesis of Compound B"]),
            )
            .unwrap();

        // B was never created, so the route falls back to A
        assert_eq!(outcome.synthesis_created, 1);
        let store = ingestor.store();
        let store = store.lock().unwrap();
        let paper = store.get_paper(outcome.paper_id).unwrap().unwrap();
        let compounds = store.get_compounds(&paper.related_compounds).unwrap();
        assert_eq!(compounds.len(), 1);
        assert!(compounds[0].synthesis_route.is_some());
    }

    #[test]
    fn test_failed_back_reference_is_a_warning() {
        let mut store = FlakyStore::new();
        store.fail_route_links = true;
        let (ingestor, _dir) =
            ingestor_with(MockProvider::default(), store, IngestConfig::default());

        let outcome = ingestor
            .commit(&IngestContext::default(), request("Paper", &["A"], &["Make A"]))
            .unwrap();

        assert_eq!(outcome.synthesis_created, 1);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_failed_paper_update_is_a_warning() {
        let mut store = FlakyStore::new();
        store.fail_paper_links = true;
        let (ingestor, _dir) =
            ingestor_with(MockProvider::default(), store, IngestConfig::default());

        let outcome = ingestor
            .commit(&IngestContext::default(), request("Paper", &["A", "B"], &[]))
            .unwrap();

        assert_eq!(outcome.compounds_created, 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.paper.related_compounds.is_empty());
    }

    #[test]
    fn test_commit_applies_defaults() {
        let (ingestor, _dir) = ingestor(MockProvider::default());
        let mut req = request("Paper", &["A"], &["Make A"]);
        req.compound_candidates[0].possible_smiles = "CC".to_string();

        let outcome = ingestor.commit(&IngestContext::default(), req).unwrap();

        let store = ingestor.store();
        let store = store.lock().unwrap();
        let paper = store.get_paper(outcome.paper_id).unwrap().unwrap();
        let compound = store.get_compound(paper.related_compounds[0]).unwrap().unwrap();
        assert_eq!(compound.category, "Heterocycle");
        assert_eq!(compound.smiles, "CC");

        let route = store
            .get_synthesis_route(compound.synthesis_route.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(route.notes, "Extracted from uploaded paper");
        assert_eq!(route.status, retort_domain::RouteStatus::Pending);
        assert!(route.created_by.is_none());
    }

    #[test]
    fn test_later_route_overwrites_back_reference() {
        let (ingestor, _dir) = ingestor(MockProvider::default());
        let outcome = ingestor
            .commit(
                &IngestContext::default(),
                request("Paper", &["A"], &["A route one", "A route two"]),
            )
            .unwrap();
        assert_eq!(outcome.synthesis_created, 2);

        let store = ingestor.store();
        let store = store.lock().unwrap();
        let paper = store.get_paper(outcome.paper_id).unwrap().unwrap();
        let compound = store.get_compound(paper.related_compounds[0]).unwrap().unwrap();
        let route = store
            .get_synthesis_route(compound.synthesis_route.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(route.name, "A route two");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = IngestConfig {
            ai_timeout_secs: 0,
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let result = Ingestor::new(
            MockProvider::default(),
            SqliteStore::in_memory().unwrap(),
            LocalDocumentStorage::new(dir.path()),
            config,
        );
        assert!(matches!(result, Err(IngestError::Config(_))));
    }
}
