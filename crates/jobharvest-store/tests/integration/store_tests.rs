use std::fs;

use chrono::{TimeZone, Utc};
use jobharvest_core::models::{JobType, WorkSetting};
use jobharvest_core::traits::RecordStore;
use jobharvest_store::{CsvStore, ExcelStore, JsonStore};

use crate::integration::common::{job, temp_output};

#[test]
fn every_encoding_round_trips_a_record() {
    let (_, config, _dir) = temp_output();
    let mut record = job("Senior Engineer", "Acme", "Berlin", "2 days ago");
    record.company_logo = Some("https://acme.com/logo.png".into());
    record.requirements = "Rust, Tokio".into();

    let stores: Vec<Box<dyn RecordStore>> = vec![
        Box::new(CsvStore::new(config.csv_path())),
        Box::new(JsonStore::new(config.json_path())),
        Box::new(ExcelStore::new(config.xlsx_path())),
    ];
    for store in &stores {
        store.save(std::slice::from_ref(&record)).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![record.clone()], "format {}", store.name());
        assert_eq!(loaded[0].work_setting, WorkSetting::Remote);
        assert_eq!(loaded[0].job_type, JobType::FullTime);
    }
}

#[test]
fn output_store_merges_into_every_file() {
    let (store, config, _dir) = temp_output();
    let first = job("Backend Engineer", "Acme", "Remote", "");
    let second = job("Data Analyst", "Globex", "Paris", "yesterday");

    store.save(std::slice::from_ref(&first)).unwrap();
    store.save(std::slice::from_ref(&second)).unwrap();

    let expected = vec![first, second];
    assert_eq!(CsvStore::new(config.csv_path()).load().unwrap(), expected);
    assert_eq!(JsonStore::new(config.json_path()).load().unwrap(), expected);
    assert_eq!(ExcelStore::new(config.xlsx_path()).load().unwrap(), expected);
}

#[test]
fn date_collected_survives_merges() {
    let (store, config, _dir) = temp_output();
    let mut old = job("Old Posting", "Acme", "Remote", "");
    old.date_collected = Utc.with_ymd_and_hms(2023, 11, 5, 8, 30, 0).unwrap();
    store.save(std::slice::from_ref(&old)).unwrap();
    store
        .save(&[job("New Posting", "Acme", "Remote", "")])
        .unwrap();

    for loaded in [
        CsvStore::new(config.csv_path()).load().unwrap(),
        JsonStore::new(config.json_path()).load().unwrap(),
        ExcelStore::new(config.xlsx_path()).load().unwrap(),
    ] {
        assert_eq!(loaded[0].date_collected, old.date_collected);
    }
}

#[test]
fn legacy_csv_timestamps_are_read_as_utc() {
    let (_, config, _dir) = temp_output();
    fs::create_dir_all(config.output_dir()).unwrap();
    fs::write(
        config.csv_path(),
        "job_title,company,location,work_setting,job_type,company_logo,job_description,\
         requirements,application_url,date_posted,date_collected,source_url\n\
         Engineer,Acme,Remote,remote,full-time,,Build things,,https://a.com/1,,2024-03-01 10:00:00,https://a.com/1\n",
    )
    .unwrap();

    let loaded = CsvStore::new(config.csv_path()).load().unwrap();
    assert_eq!(
        loaded[0].date_collected,
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(loaded[0].company_logo, None);
}
