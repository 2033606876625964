use dchdigi_algorithms::{Digitizer, DigitizerConfig};
use dchdigi_core::EventHeader;
use dchdigi_geometry::{BitFieldCoder, DetectorConfig, WireGeometryModel};
use dchdigi_io::{
    load_calibration, write_debug_histograms, DigiFileWriter, EventFileReader, OutputFormat,
};
use std::sync::Arc;

const CALIBRATION: &str = r#"{
    "path_length_edges_cm": [0.0, 1.0, 5.0],
    "buckets": [
        { "count": { "values": [1, 2], "weights": [1, 1] },
          "size":  { "values": [1], "weights": [1] } },
        { "count": { "values": [10], "weights": [1] },
          "size":  { "values": [1, 3], "weights": [1, 1] } }
    ]
}"#;

fn events_json() -> String {
    let coder = BitFieldCoder::default();
    let id = |sl: i64, l: i64, phi: i64| {
        let id = coder.set(0, "superlayer", sl).unwrap();
        let id = coder.set(id, "layer", l).unwrap();
        coder.set(id, "nphi", phi).unwrap()
    };
    format!(
        r#"[
        {{ "run": 3, "event": 1, "hits": [
            {{ "cell_id": {}, "position": {{ "x": 365.0, "y": 10.0, "z": 100.0 }},
               "momentum": {{ "x": 1.0, "y": 0.0, "z": 0.2 }},
               "edep": 2.0e-6, "path_length": 12.0, "time": 1.0 }},
            {{ "cell_id": {}, "position": {{ "x": 0.0, "y": 500.0, "z": -50.0 }},
               "momentum": {{ "x": 0.0, "y": 1.0, "z": 0.0 }},
               "edep": 1.0e-6, "path_length": 6.0, "time": 2.0 }}
        ] }},
        {{ "run": 3, "event": 2, "hits": [] }}
    ]"#,
        id(0, 0, 0),
        id(1, 3, 60)
    )
}

#[test]
fn test_file_to_file_digitization() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = dir.path().join("events.json");
    let calibration_path = dir.path().join("calibration.json");
    let output_path = dir.path().join("digis.csv");
    let debug_path = dir.path().join("debug.csv");
    std::fs::write(&events_path, events_json()).unwrap();
    std::fs::write(&calibration_path, CALIBRATION).unwrap();

    let config = DigitizerConfig::default()
        .with_calibration_file(&calibration_path)
        .with_debug_histograms(true);
    let calibration = load_calibration(config.calibration_file.as_ref().unwrap()).unwrap();
    let geometry = Arc::new(WireGeometryModel::new(DetectorConfig::idea_defaults()).unwrap());
    let digitizer =
        Digitizer::with_bitfield_decoder(config, geometry, Arc::new(calibration)).unwrap();

    let reader = EventFileReader::open(&events_path).unwrap();
    let (collections, histos) = digitizer
        .process_events_with_debug(reader.events())
        .unwrap();
    let headers: Vec<EventHeader> = reader.events().iter().map(|e| e.header).collect();
    let output: Vec<_> = headers.into_iter().zip(collections).collect();

    let format = OutputFormat::from_path(&output_path).unwrap();
    let mut writer = DigiFileWriter::create(&output_path).unwrap();
    writer.write(format, &output).unwrap();
    write_debug_histograms(&debug_path, &histos).unwrap();

    let csv = std::fs::read_to_string(&output_path).unwrap();
    let rows: Vec<_> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("3,1,0,0,"));
    assert!(rows[1].starts_with("3,1,1,1,"));
    // 12 mm path: ten clusters of size 1 or 3
    let sizes = rows[0].rsplit(',').next().unwrap();
    assert_eq!(sizes.split(';').count(), 10);

    assert_eq!(histos.smearing_along.entries(), 2);
    assert!(std::fs::read_to_string(&debug_path)
        .unwrap()
        .contains("clamped_lookups,,,,0"));
}

#[test]
fn test_rerun_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let calibration_path = dir.path().join("calibration.json");
    std::fs::write(&calibration_path, CALIBRATION).unwrap();
    let events = EventFileReader::from_json(&events_json()).unwrap();

    let run = |name: &str| {
        let geometry = Arc::new(WireGeometryModel::new(DetectorConfig::idea_defaults()).unwrap());
        let calibration = load_calibration(&calibration_path).unwrap();
        let digitizer = Digitizer::with_bitfield_decoder(
            DigitizerConfig::default().with_seed(99),
            geometry,
            Arc::new(calibration),
        )
        .unwrap();
        let collections = digitizer.process_events(&events).unwrap();
        let output: Vec<_> = events.iter().map(|e| e.header).zip(collections).collect();
        let path = dir.path().join(name);
        DigiFileWriter::create(&path)
            .unwrap()
            .write_binary(&output)
            .unwrap();
        std::fs::read(path).unwrap()
    };

    assert_eq!(run("a.bin"), run("b.bin"));
}
