// End-to-end tests over CSV inputs and the parallel orchestrator.

#[cfg(test)]
mod integration_tests {
    use std::fs;
    use std::path::Path;

    use area_statistics::config::{EngineSettings, FailurePolicy, RunConfig};
    use area_statistics::enrichment::null::DEFAULT_SEED;
    use area_statistics::enrichment::{Backend, area_score, null_distribution};
    use area_statistics::io::read_significance;
    use area_statistics::orchestrate::{OrchestratorOptions, run};
    use area_statistics::pipeline::{readjust, run_area};
    use area_statistics::plan::{ColumnFilters, Disposition, TaskRecord, plan};
    use area_statistics::table::{Column, Table};
    use area_statistics::testing::inference::nes_pval;

    fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let attributes = dir.join("attributes.csv");
        let values = dir.join("values.csv");

        let mut a = String::from(",sample,front,alt,none\n");
        let mut v = String::from(",sample,up,down,flat\n");
        for i in 0..10 {
            let front = if i < 5 { 1 } else { 0 };
            let alt = if i % 2 == 0 { 1 } else { 0 };
            a.push_str(&format!("{},s{},{},{},0\n", i, i, front, alt));
            v.push_str(&format!("{},s{},{},{},7\n", i, i, i + 1, 10 - i));
        }
        fs::write(&attributes, a).unwrap();
        fs::write(&values, v).unwrap();
        (attributes, values)
    }

    #[test]
    fn test_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let (attributes, values) = write_inputs(dir.path());
        let out = dir.path().join("results");

        let mut config = RunConfig::new(&attributes, &values, "sample", &out);
        config.workers = 2;
        config.shuffle_seed = Some(5);
        config.engine = EngineSettings {
            permutations: 300,
            ..Default::default()
        };

        let outcome = run_area(&config).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.report.groups, 2);
        assert_eq!(outcome.report.records.len(), 4);

        let plan_csv = fs::read_to_string(&outcome.plan_path).unwrap();
        let mut lines = plan_csv.lines();
        assert_eq!(lines.next().unwrap(), "ranking_column,attribute,disposition");
        assert_eq!(lines.next().unwrap(), "up,front,run");
        assert_eq!(plan_csv.lines().count(), 10);
        assert!(plan_csv.contains("flat,front,excluded_constant_ranking"));
        assert!(plan_csv.contains("up,none,excluded_constant_attribute"));

        let unadjusted = read_significance(&outcome.unadjusted_path).unwrap();
        assert_eq!(unadjusted.len(), 4);
        let front_up = unadjusted
            .iter()
            .find(|r| r.attribute == "front" && r.ranking_column == "up")
            .unwrap();
        assert!(front_up.nes.is_finite());
        assert!(front_up.pval < 0.01);

        let adjusted_csv = fs::read_to_string(&outcome.adjusted_path).unwrap();
        assert!(adjusted_csv.starts_with(
            "attribute,ranking_column,NES,pval,p_bonferroni,p_holm,p_fdr_bh,p_fdr_by\n"
        ));
        assert_eq!(adjusted_csv.lines().count(), 5);

        // Re-adjusting the persisted raw p-values reproduces the same table.
        let again = dir.path().join("again.csv");
        readjust(&outcome.unadjusted_path, &again).unwrap();
        assert_eq!(fs::read_to_string(&again).unwrap(), adjusted_csv);
    }

    #[test]
    fn test_pipeline_honours_lists() {
        let dir = tempfile::tempdir().unwrap();
        let (attributes, values) = write_inputs(dir.path());
        let exclude = dir.path().join("exclude_values.txt");
        let keep = dir.path().join("keep_attributes.txt");
        fs::write(&exclude, "down\n").unwrap();
        fs::write(&keep, "front\n").unwrap();

        let mut config = RunConfig::new(&attributes, &values, "sample", dir.path().join("out"));
        config.workers = 1;
        config.shuffle_seed = Some(1);
        config.exclude_values_file = Some(exclude);
        config.include_attributes_file = Some(keep);
        config.engine.permutations = 100;

        let outcome = run_area(&config).unwrap();
        assert_eq!(outcome.report.records.len(), 1);
        assert_eq!(outcome.report.records[0].attribute, "front");
        assert_eq!(outcome.report.records[0].ranking_column, "up");

        let plan_csv = fs::read_to_string(&outcome.plan_path).unwrap();
        assert!(plan_csv.contains("down,front,ignored_by_exclude_list"));
        assert!(plan_csv.contains("up,alt,ignored_not_in_include_list"));
    }

    #[test]
    fn test_missing_key_column_fails_before_computation() {
        let dir = tempfile::tempdir().unwrap();
        let (attributes, values) = write_inputs(dir.path());
        let out = dir.path().join("out");
        let config = RunConfig::new(&attributes, &values, "participant", &out);

        let err = run_area(&config).unwrap_err();
        assert!(err.to_string().contains("key column 'participant' not found"));
        assert!(!out.exists());
    }

    fn sparse_tables() -> (Table, Table) {
        let keys: Vec<String> = (0..8).map(|i| format!("s{}", i)).collect();
        let rankings = Table::new(
            "sample",
            keys.clone(),
            vec![Column::new("GENE1", (0..8).map(|i| i as f64).collect())],
        )
        .unwrap();

        // "orphan" only has a hit on a sample missing from the rankings.
        let mut attribute_keys = keys;
        attribute_keys.push("s99".to_string());
        let attributes = Table::new(
            "sample",
            attribute_keys,
            vec![
                Column::new("good", vec![1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                Column::new("orphan", vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
            ],
        )
        .unwrap();
        (rankings, attributes)
    }

    fn small_engine() -> EngineSettings {
        EngineSettings {
            permutations: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_attribute_without_joined_hits_does_not_abort() {
        let (rankings, attributes) = sparse_tables();
        let tasks = plan(&rankings, &attributes, &ColumnFilters::default());
        assert!(tasks.iter().all(|t| t.disposition == Disposition::Run));

        let options = OrchestratorOptions {
            workers: 2,
            shuffle_seed: Some(2),
            engine: small_engine(),
            ..Default::default()
        };
        let report = run(&tasks, &rankings, &attributes, &options).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].attribute, "good");
        assert!(report.records[0].pval.is_finite());
        assert_eq!(report.records[1].attribute, "orphan");
        assert!(report.records[1].nes.is_nan());
        assert!(report.records[1].pval.is_nan());
    }

    // A task naming a ranking column the table does not have fails its group.
    fn tasks_with_broken_group(rankings: &Table, attributes: &Table) -> Vec<TaskRecord> {
        let mut tasks = plan(rankings, attributes, &ColumnFilters::default());
        tasks.push(TaskRecord {
            ranking_column: "MISSING".to_string(),
            attribute: "orphan".to_string(),
            disposition: Disposition::Run,
        });
        tasks
    }

    #[test]
    fn test_best_effort_keeps_sibling_groups() {
        let (rankings, attributes) = sparse_tables();
        let tasks = tasks_with_broken_group(&rankings, &attributes);

        let options = OrchestratorOptions {
            workers: 2,
            shuffle_seed: Some(2),
            failure_policy: FailurePolicy::BestEffort,
            engine: small_engine(),
            ..Default::default()
        };
        let report = run(&tasks, &rankings, &attributes, &options).unwrap();
        assert!(!report.is_complete());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].attribute, "good");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].attribute, "orphan");
        assert!(report.failures[0].error.contains("Ranking column 'MISSING' not found"));
    }

    #[test]
    fn test_fail_fast_names_failing_attribute() {
        let (rankings, attributes) = sparse_tables();
        let tasks = tasks_with_broken_group(&rankings, &attributes);
        let options = OrchestratorOptions {
            workers: 2,
            shuffle_seed: Some(2),
            engine: small_engine(),
            ..Default::default()
        };
        let err = run(&tasks, &rankings, &attributes, &options).unwrap_err();
        assert!(err.to_string().contains("Attribute group 'orphan' failed"));
    }

    #[test]
    fn test_pipeline_with_sample_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let (attributes, values) = write_inputs(dir.path());
        let samples = dir.path().join("samples.txt");
        // drops every sample carrying "front"
        fs::write(&samples, "s5\ns6\ns7\ns8\ns9\n").unwrap();

        let mut config = RunConfig::new(&attributes, &values, "sample", dir.path().join("out"));
        config.workers = 2;
        config.shuffle_seed = Some(4);
        config.sample_file = Some(samples);
        config.engine.permutations = 300;

        let outcome = run_area(&config).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.report.records.len(), 4);

        // alt over s5..s9 in "up" order is [0, 1, 0, 1, 0]
        let backend = Backend::Cpu.array_backend();
        let joined = [0.0, 1.0, 0.0, 1.0, 0.0];
        let null = null_distribution(backend, &joined, 300, DEFAULT_SEED).unwrap();
        let (expected_nes, expected_pval) =
            nes_pval(area_score(backend, &joined).unwrap().score, &null);

        let unadjusted = read_significance(&outcome.unadjusted_path).unwrap();
        let alt_up = unadjusted
            .iter()
            .find(|r| r.attribute == "alt" && r.ranking_column == "up")
            .unwrap();
        assert_eq!(alt_up.nes, expected_nes);
        assert_eq!(alt_up.pval, expected_pval);

        let adjusted_csv = fs::read_to_string(&outcome.adjusted_path).unwrap();
        let lines: Vec<&str> = adjusted_csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "front,up,NaN,NaN,,,,");
        assert_eq!(lines[4], "front,down,NaN,NaN,,,,");
        assert!(lines[1].starts_with("alt,"));
        assert!(!lines[1].ends_with(",,,,"));
    }
}
