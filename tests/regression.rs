//! Regression tests for the output of the demo model.
use firefleet::model::Model;
use firefleet::simulation;
use float_cmp::approx_eq;
use std::fs::{read_dir, read_to_string};
use std::path::Path;
use tempfile::tempdir;

/// Files which depend only on the model and its seed
const RESULT_FILE_NAMES: [&str; 6] = [
    "fleet_configuration.csv",
    "multi_year_plan.csv",
    "demand_series.csv",
    "relay_deployment.csv",
    "relay_summary.csv",
    "budget_report.csv",
];

/// Run the demo model into the given folder
fn run_demo(output_dir: &Path) {
    let model = Model::from_path("demos/wildfire").unwrap();
    simulation::run(&model, output_dir, false).unwrap();
}

/// Read a CSV file's fields, skipping the header
fn read_fields(path: &Path) -> Vec<Vec<String>> {
    csv::Reader::from_path(path)
        .unwrap()
        .records()
        .map(|record| record.unwrap().iter().map(String::from).collect())
        .collect()
}

fn parse(field: &str) -> f64 {
    field.parse().unwrap()
}

/// Two runs of the same model with the same seed give the same results
#[test]
fn test_demo_output_reproducible() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    run_demo(dir1.path());
    run_demo(dir2.path());

    let file_names = |dir: &Path| {
        let mut names: Vec<_> = read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        names.sort();
        names
    };
    assert_eq!(file_names(dir1.path()), file_names(dir2.path()));

    let mut errors = Vec::new();
    for file_name in RESULT_FILE_NAMES {
        compare_lines(
            file_name,
            &read_to_string(dir1.path().join(file_name)).unwrap(),
            &read_to_string(dir2.path().join(file_name)).unwrap(),
            &mut errors,
        );
    }

    assert!(errors.is_empty(), "Outputs differ:\n{}", errors.join("\n"));
}

/// The demo's output files agree with one another
#[test]
fn test_demo_output_consistent() {
    let dir = tempdir().unwrap();
    run_demo(dir.path());

    // One row per equipment class, all sized optimally
    let fleet = read_fields(&dir.path().join("fleet_configuration.csv"));
    assert_eq!(fleet.len(), 2);
    assert!(fleet.iter().all(|row| row[7] == "optimal"));
    let counts: Vec<&str> = fleet.iter().map(|row| row[3].as_str()).collect();
    let investment: f64 = fleet.iter().map(|row| parse(&row[5])).sum();

    // Base year plus ten planned years, starting from the base-year fleet
    let plan = read_fields(&dir.path().join("multi_year_plan.csv"));
    assert_eq!(plan.len(), 11);
    assert_eq!(plan[0][0], "0");
    assert_eq!([plan[0][7].as_str(), plan[0][8].as_str()], counts[..]);
    let annual_costs: Vec<f64> = plan.iter().map(|row| parse(&row[9])).collect();

    let budget = read_fields(&dir.path().join("budget_report.csv"));
    assert_eq!(budget.len(), 1);
    let budget = &budget[0];
    assert!(approx_eq!(f64, parse(&budget[0]), investment));
    assert!(approx_eq!(
        f64,
        parse(&budget[1]),
        annual_costs.iter().sum::<f64>()
    ));
    assert!(approx_eq!(
        f64,
        parse(&budget[2]),
        annual_costs[1..].iter().sum::<f64>() / 10.0
    ));

    let summary = read_fields(&dir.path().join("relay_summary.csv"));
    assert_eq!(summary, [["optimal", "1"]]);
}

/// Compare two files line by line, allowing for small differences in numeric fields
fn compare_lines(file_name: &str, content1: &str, content2: &str, errors: &mut Vec<String>) {
    let lines1: Vec<&str> = content1.lines().collect();
    let lines2: Vec<&str> = content2.lines().collect();
    if lines1.len() != lines2.len() {
        errors.push(format!(
            "{file_name}: different number of lines ({} vs {})",
            lines1.len(),
            lines2.len()
        ));
        return;
    }

    for (num, (line1, line2)) in lines1.into_iter().zip(lines2).enumerate() {
        if !lines_match(line1, line2) {
            errors.push(format!("{file_name}, line {num}:\n    + {line1}\n    - {line2}"));
        }
    }
}

fn lines_match(line1: &str, line2: &str) -> bool {
    let fields1: Vec<&str> = line1.split(',').collect();
    let fields2: Vec<&str> = line2.split(',').collect();
    fields1.len() == fields2.len()
        && fields1
            .into_iter()
            .zip(fields2)
            .all(|(a, b)| match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(a), Ok(b)) => approx_eq!(f64, a, b, epsilon = 1e-10),
                _ => a == b,
            })
}
