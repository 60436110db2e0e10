use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use crate::storage::{KeyValueStore, Problem, ProblemFields, ProblemStore};
use std::collections::HashSet;

/// Which text field a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Topic,
    Difficulty,
}

impl SearchField {
    fn value<'a>(&self, problem: &'a Problem) -> &'a str {
        match self {
            SearchField::Topic => &problem.topic,
            SearchField::Difficulty => &problem.difficulty,
        }
    }
}

/// Repository over the problem list. Every call goes back to the store.
pub struct ProblemService<S> {
    store: ProblemStore<S>,
}

impl<S: KeyValueStore> ProblemService<S> {
    pub fn new(medium: S) -> Self {
        ProblemService {
            store: ProblemStore::new(medium),
        }
    }

    pub fn store(&self) -> &ProblemStore<S> {
        &self.store
    }

    /// Load all problems in stored order
    pub fn all(&self) -> Result<Vec<Problem>> {
        Ok(self.store.load()?)
    }

    /// Get a problem by ID
    pub fn find_by_id(&self, id: &str) -> Result<Option<Problem>> {
        Ok(self.store.load()?.into_iter().find(|p| p.id == id))
    }

    /// Append a new problem and persist
    pub fn add(&self, fields: ProblemFields) -> Result<Problem> {
        let mut problems = self.store.load()?;
        let mut problem = Problem::new(fields);

        let mut salt = 0i64;
        while problems.iter().any(|p| p.id == problem.id) {
            salt += 1;
            let nanos = Utc::now().timestamp_nanos_opt().unwrap_or(0) + salt;
            problem.id = Problem::generate_id(&problem.title, nanos);
        }

        problems.push(problem.clone());
        self.store.save(&problems)?;
        log::info!("added problem {} ({})", problem.id, problem.title);

        Ok(problem)
    }

    /// Overwrite the user fields of an existing problem. Returns false when the
    /// ID is unknown, in which case nothing is written.
    pub fn update(&self, id: &str, fields: ProblemFields) -> Result<bool> {
        let mut problems = self.store.load()?;

        let Some(problem) = problems.iter_mut().find(|p| p.id == id) else {
            log::debug!("update skipped, no problem with id {}", id);
            return Ok(false);
        };
        problem.apply(fields);

        self.store.save(&problems)?;
        log::info!("updated problem {}", id);
        Ok(true)
    }

    /// Remove a problem. The remainder is persisted even if nothing matched.
    pub fn remove(&self, id: &str) -> Result<Vec<Problem>> {
        let mut problems = self.store.load()?;
        let before = problems.len();
        problems.retain(|p| p.id != id);

        self.store.save(&problems)?;
        log::info!("removed {} problem(s) with id {}", before - problems.len(), id);
        Ok(problems)
    }

    /// Case-insensitive substring search on one field. Nothing is persisted.
    pub fn search(&self, field: SearchField, keyword: &str) -> Result<Vec<Problem>> {
        let keyword = keyword.to_lowercase();

        let filtered: Vec<Problem> = self
            .store
            .load()?
            .into_iter()
            .filter(|p| field.value(p).to_lowercase().contains(&keyword))
            .collect();

        Ok(filtered)
    }

    /// Sort newest first and persist the new order
    pub fn sort_by_date(&self) -> Result<Vec<Problem>> {
        let mut problems = self.store.load()?;
        sort_newest_first(&mut problems);
        self.store.save(&problems)?;
        log::info!("sorted {} problems by date", problems.len());
        Ok(problems)
    }

    /// Sort easy -> medium -> hard -> anything else and persist the new order
    pub fn sort_by_difficulty(&self) -> Result<Vec<Problem>> {
        let mut problems = self.store.load()?;
        sort_by_difficulty_rank(&mut problems);
        self.store.save(&problems)?;
        log::info!("sorted {} problems by difficulty", problems.len());
        Ok(problems)
    }

    /// Get statistics about the collection
    pub fn statistics(&self) -> Result<ProblemStatistics> {
        let problems = self.store.load()?;
        let mut stats = ProblemStatistics {
            total: problems.len(),
            ..ProblemStatistics::default()
        };

        for problem in &problems {
            match difficulty_rank(&problem.difficulty) {
                1 => stats.easy += 1,
                2 => stats.medium += 1,
                3 => stats.hard += 1,
                _ => stats.other += 1,
            }
        }
        let topics: HashSet<String> = problems.iter().map(|p| p.topic.to_lowercase()).collect();
        stats.unique_topics = topics.len();

        Ok(stats)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProblemStatistics {
    pub total: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub other: usize,
    pub unique_topics: usize,
}

/// easy=1, medium=2, hard=3, everything else 4
pub fn difficulty_rank(difficulty: &str) -> u8 {
    match difficulty.trim().to_lowercase().as_str() {
        "easy" => 1,
        "medium" => 2,
        "hard" => 3,
        _ => 4,
    }
}

/// Accepts RFC 3339, a bare local-less datetime, or a bare date (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// Stable; unparseable dates compare as None and end up last.
fn sort_newest_first(problems: &mut [Problem]) {
    problems.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date)));
}

fn sort_by_difficulty_rank(problems: &mut [Problem]) {
    problems.sort_by_key(|p| difficulty_rank(&p.difficulty));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreError, store::PROBLEMS_KEY};
    use pretty_assertions::assert_eq;

    fn fields(title: &str, topic: &str, difficulty: &str) -> ProblemFields {
        ProblemFields {
            title: title.to_string(),
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
            code: "x=1".to_string(),
        }
    }

    fn record(id: &str, difficulty: &str, date: &str) -> Problem {
        Problem {
            id: id.to_string(),
            title: id.to_string(),
            topic: "Arrays".to_string(),
            difficulty: difficulty.to_string(),
            code: "x".to_string(),
            date: date.to_string(),
        }
    }

    fn seeded(problems: &[Problem]) -> ProblemService<MemoryStore> {
        let service = ProblemService::new(MemoryStore::new());
        service.store().save(problems).unwrap();
        service
    }

    #[test]
    fn add_stamps_new_record_and_grows_by_one() {
        let service = ProblemService::new(MemoryStore::new());
        let before = Utc::now();

        let added = service.add(fields("T", "Arrays", "Easy")).unwrap();

        assert!(!added.id.is_empty());
        assert_eq!(added.title, "T");
        assert_eq!(added.topic, "Arrays");
        assert_eq!(added.difficulty, "Easy");
        assert_eq!(added.code, "x=1");
        let stamped = parse_date(&added.date).unwrap();
        assert!((stamped - before).num_seconds().abs() < 5);
        assert_eq!(service.all().unwrap(), vec![added]);
    }

    #[test]
    fn add_appends_in_insertion_order_with_unique_ids() {
        let service = ProblemService::new(MemoryStore::new());
        for _ in 0..20 {
            service.add(fields("Same title", "Arrays", "Easy")).unwrap();
        }
        let all = service.all().unwrap();
        let ids: HashSet<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(all.len(), 20);
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn find_by_id_returns_match_or_none() {
        let service = seeded(&[record("1", "Easy", "2024-01-01")]);
        assert_eq!(service.find_by_id("1").unwrap().map(|p| p.id), Some("1".to_string()));
        assert_eq!(service.find_by_id("2").unwrap(), None);
    }

    #[test]
    fn update_replaces_fields_but_keeps_id_and_date() {
        let service = seeded(&[record("1", "Easy", "2024-01-01")]);

        let updated = service.update("1", fields("New", "Graphs", "Hard")).unwrap();

        assert!(updated);
        let problem = service.find_by_id("1").unwrap().unwrap();
        assert_eq!(problem.title, "New");
        assert_eq!(problem.topic, "Graphs");
        assert_eq!(problem.difficulty, "Hard");
        assert_eq!(problem.date, "2024-01-01");
    }

    #[test]
    fn update_of_unknown_id_changes_nothing() {
        let original = vec![record("1", "Easy", "2024-01-01")];
        let service = seeded(&original);

        let updated = service.update("missing", fields("New", "Graphs", "Hard")).unwrap();

        assert!(!updated);
        assert_eq!(service.all().unwrap(), original);
    }

    #[test]
    fn remove_of_unknown_id_leaves_collection_unchanged() {
        let original = vec![record("1", "Easy", "2024-01-01"), record("2", "Hard", "2024-02-01")];
        let service = seeded(&original);

        let remaining = service.remove("missing").unwrap();

        assert_eq!(remaining, original);
        assert_eq!(service.all().unwrap(), original);
    }

    #[test]
    fn remove_persists_even_when_nothing_matched() {
        let service = ProblemService::new(MemoryStore::new());
        service.remove("missing").unwrap();
        assert_eq!(
            service.store().medium().get(PROBLEMS_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn n_inserts_then_n_deletes_leave_empty_sequence() {
        let service = ProblemService::new(MemoryStore::new());
        let mut ids: Vec<String> = (0..6)
            .map(|i| service.add(fields(&format!("p{}", i), "Arrays", "Easy")).unwrap().id)
            .collect();
        // delete out of insertion order
        ids.swap(0, 4);
        ids.reverse();
        for id in &ids {
            service.remove(id).unwrap();
        }

        assert!(service.all().unwrap().is_empty());
        assert_eq!(
            service.store().medium().get(PROBLEMS_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn search_by_topic_is_case_insensitive_substring() {
        let mut arrays = record("1", "Easy", "2024-01-01");
        arrays.topic = "Arrays & Hashing".to_string();
        let mut graphs = record("2", "Hard", "2024-01-01");
        graphs.topic = "Graphs".to_string();
        let service = seeded(&[arrays, graphs]);

        let found = service.search(SearchField::Topic, "array").unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn search_by_difficulty_does_not_persist() {
        let service = seeded(&[record("1", "Hard", "2024-01-01"), record("2", "easy", "2024-01-01")]);
        let before = service.store().medium().get(PROBLEMS_KEY).unwrap();

        let found = service.search(SearchField::Difficulty, "EASY").unwrap();

        assert_eq!(found.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(service.store().medium().get(PROBLEMS_KEY).unwrap(), before);
    }

    #[test]
    fn sort_by_difficulty_orders_known_ranks_then_unknown() {
        let service = seeded(&[
            record("a", "Hard", "2024-01-01"),
            record("b", "easy", "2024-01-01"),
            record("c", "weird", "2024-01-01"),
            record("d", "Medium", "2024-01-01"),
        ]);

        let sorted = service.sort_by_difficulty().unwrap();

        let order: Vec<&str> = sorted.iter().map(|p| p.difficulty.as_str()).collect();
        assert_eq!(order, vec!["easy", "Medium", "Hard", "weird"]);
        assert_eq!(service.all().unwrap(), sorted);
    }

    #[test]
    fn sort_by_difficulty_keeps_relative_order_of_ties() {
        let service = seeded(&[
            record("x1", "other", "2024-01-01"),
            record("e1", "Easy", "2024-01-01"),
            record("x2", "???", "2024-01-01"),
            record("e2", "EASY", "2024-01-01"),
        ]);

        let sorted = service.sort_by_difficulty().unwrap();

        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "x1", "x2"]);
    }

    #[test]
    fn sort_by_date_is_newest_first_and_persisted() {
        let service = seeded(&[record("old", "Easy", "2024-01-01"), record("new", "Easy", "2024-06-01")]);

        let sorted = service.sort_by_date().unwrap();

        let dates: Vec<&str> = sorted.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-01-01"]);
        assert_eq!(service.all().unwrap(), sorted);
    }

    #[test]
    fn sort_by_date_handles_mixed_formats_and_garbage() {
        let service = seeded(&[
            record("garbage", "Easy", "not a date"),
            record("mid", "Easy", "2024-03-01T12:00:00.000Z"),
            record("late", "Easy", "2024-03-01T13:00:00"),
            record("early", "Easy", "2024-01-01"),
        ]);

        let sorted = service.sort_by_date().unwrap();

        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["late", "mid", "early", "garbage"]);
    }

    #[test]
    fn corrupt_store_propagates_from_every_call() {
        let medium = MemoryStore::new();
        medium.set(PROBLEMS_KEY, "oops").unwrap();
        let service = ProblemService::new(medium);

        let err = service.add(fields("T", "Arrays", "Easy")).unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Corrupt { .. })));
        assert!(service.all().is_err());
        assert!(service.sort_by_date().is_err());
    }

    #[test]
    fn separate_services_see_each_others_writes() {
        let medium = MemoryStore::new();
        let tab_a = ProblemService::new(medium.clone());
        let tab_b = ProblemService::new(medium);

        let added = tab_a.add(fields("T", "Arrays", "Easy")).unwrap();

        assert_eq!(tab_b.find_by_id(&added.id).unwrap(), Some(added));
    }

    #[test]
    fn statistics_counts_ranks_and_topics() {
        let mut graphs = record("3", "weird", "2024-01-01");
        graphs.topic = "Graphs".to_string();
        let mut arrays_upper = record("4", "HARD", "2024-01-01");
        arrays_upper.topic = "ARRAYS".to_string();
        let service = seeded(&[
            record("1", "Easy", "2024-01-01"),
            record("2", "easy", "2024-01-01"),
            graphs,
            arrays_upper,
        ]);

        let stats = service.statistics().unwrap();

        assert_eq!(
            stats,
            ProblemStatistics {
                total: 4,
                easy: 2,
                medium: 0,
                hard: 1,
                other: 1,
                unique_topics: 2,
            }
        );
    }
}
