//! End-to-end checks over synthetic dialog buffers.

use glagol_core::{
    CodePage, DialogFile, Error, HeuristicConfig, ReconcilePolicy, ScanStrategy, Scanner,
    ScannerConfig, WriteWarning, Writer, WriterConfig,
};
use pretty_assertions::assert_eq;

/// Record header, text, padding and a record terminator, repeated
fn dialog() -> Vec<u8> {
    let cp = CodePage::windows_1251();
    let mut data = Vec::new();
    let text = |data: &mut Vec<u8>, s: &str| data.extend(cp.encode_strict(s).unwrap());

    data.extend([0x07, 0x00, 0x01, 0x00]);
    text(&mut data, "Здравствуй, путник! Куда держишь путь?");
    data.extend([0x00, 0x00, 0x00, 0x00, 0x03, 0x00]);
    text(&mut data, "CONFIG.ini");
    data.extend([0x00, 0x05]);
    text(&mut data, "Он выиграл turnir.");
    data.push(0x80); // 'Ђ' glued to the sentence
    data.extend([0x00, 0x00, 0x02, 0x11]);
    text(&mut data, "Иду в город, там ждут.");
    text(&mut data, "‡ЋЌЏ0041");
    data.extend([0x00, 0x00, 0x00, 0x98, 0x04, 0x9d, 0x00]);
    text(&mut data, "Прощай.");
    data.extend([0x20, 0x20, 0x00, 0x06]);
    data
}

fn texts(sections: &[glagol_core::TextSection]) -> Vec<String> {
    sections.iter().map(|s| s.text.clone()).collect()
}

#[test]
fn extracts_dialog_and_skips_noise() {
    let data = dialog();
    let extraction = Scanner::new().scan(&data);

    assert_eq!(
        texts(&extraction.sections),
        vec![
            "Здравствуй, путник! Куда держишь путь?",
            "Он выиграл turnir.",
            "Иду в город, там ждут.",
            "Прощай.",
        ]
    );
    assert_eq!(extraction.sections[1].trailing_control, "Ђ");
    assert_eq!(extraction.sections[2].trailing_control, "‡ЋЌЏ0041");
    assert_eq!(extraction.report.rejected.get("reference"), Some(&1));

    let protected: Vec<usize> = extraction.protected.iter().collect();
    let marker = data.iter().position(|&b| b == 0x98).unwrap();
    assert_eq!(protected, vec![marker]);
    assert!(glagol_core::section::sections_are_consistent(&extraction.sections));
}

#[test]
fn unedited_write_is_identical() {
    let data = dialog();
    let extraction = Scanner::new().scan(&data);
    let outcome = Writer::new()
        .write(&data, &extraction.sections, &extraction.protected, &texts(&extraction.sections))
        .unwrap();
    assert_eq!(outcome.buffer, data);
    assert!(outcome.is_unchanged());
}

#[test]
fn single_edit_stays_in_its_span() {
    let data = dialog();
    let extraction = Scanner::new().scan(&data);
    let mut edited = texts(&extraction.sections);
    edited[2] = "Я иду в город.".to_string();

    let outcome = Writer::new()
        .write(&data, &extraction.sections, &extraction.protected, &edited)
        .unwrap();
    assert_eq!(outcome.buffer.len(), data.len());

    let span: Vec<usize> = extraction.sections[2].writable_positions().collect();
    for (offset, (a, b)) in data.iter().zip(&outcome.buffer).enumerate() {
        if a != b {
            assert!(span.contains(&offset), "byte {} changed outside the span", offset);
        }
    }
    for offset in &extraction.sections[2].trailing_control_positions {
        assert_eq!(outcome.buffer[*offset], data[*offset]);
    }
    for offset in extraction.protected.iter() {
        assert_eq!(outcome.buffer[offset], data[offset]);
    }
}

#[test]
fn overflow_never_exceeds_capacity() {
    let data = dialog();
    let extraction = Scanner::new().scan(&data);
    let section = &extraction.sections[3];
    let mut edited = texts(&extraction.sections);
    edited[3] = "Прощай навсегда, мой старый друг.".to_string();

    let outcome = Writer::new()
        .write(&data, &extraction.sections, &extraction.protected, &edited)
        .unwrap();
    assert!(outcome.warnings.iter().any(|w| matches!(
        w,
        WriteWarning::Truncated { section: 3, capacity, .. } if *capacity == section.capacity()
    )));
    assert_eq!(&outcome.buffer[section.end..], &data[section.end..]);
}

#[test]
fn rescan_after_write_is_stable() {
    let data = dialog();
    let scanner = Scanner::new();
    let first = scanner.scan(&data);
    let mut edited = texts(&first.sections);
    edited[0] = "Привет, путник! Куда идёшь?".to_string();

    let outcome = Writer::new()
        .write(&data, &first.sections, &first.protected, &edited)
        .unwrap();
    let second = scanner.scan(&outcome.buffer);
    assert_eq!(texts(&second.sections), edited);
    let markers = |s: &[glagol_core::TextSection]| -> Vec<String> {
        s.iter().map(|x| x.trailing_control.clone()).collect()
    };
    assert_eq!(markers(&second.sections), markers(&first.sections));

    // Writing the rescanned text again changes nothing.
    let again = Writer::new()
        .write(&outcome.buffer, &second.sections, &second.protected, &edited)
        .unwrap();
    assert_eq!(again.buffer, outcome.buffer);
}

#[test]
fn configured_undefined_byte_is_protected() {
    let data = b"Hello\x00\x00\x00\xFF".to_vec();
    let config = ScannerConfig::new().rules(HeuristicConfig::default().undefined_bytes(vec![0x98, 0xFF]));
    let scanner = Scanner::with_config(config).unwrap();
    let extraction = scanner.scan(&data);

    assert_eq!(texts(&extraction.sections), vec!["Hello"]);
    let section = &extraction.sections[0];
    assert_eq!((section.start, section.end), (0, 8));
    assert_eq!(section.capacity(), 8);
    assert!(extraction.protected.contains(8));

    let outcome = Writer::new()
        .write(&data, &extraction.sections, &extraction.protected, &["Hi".to_string()])
        .unwrap();
    assert_eq!(outcome.buffer, b"Hi\x00\x00\x00\x00\x00\x00\xFF".to_vec());
}

#[test]
fn strict_policy_refuses_count_mismatch() {
    let data = dialog();
    let extraction = Scanner::new().scan(&data);
    let writer = Writer::with_config(WriterConfig::new().policy(ReconcilePolicy::Strict));
    let err = writer
        .write(&data, &extraction.sections, &extraction.protected, &["one".to_string()])
        .unwrap_err();
    assert!(matches!(err, Error::SectionCountMismatch { expected: 4, actual: 1 }));
}

#[test]
fn best_effort_pads_missing_lines() {
    let data = dialog();
    let extraction = Scanner::new().scan(&data);
    let outcome = Writer::new()
        .write(&data, &extraction.sections, &extraction.protected, &texts(&extraction.sections)[..2])
        .unwrap();
    assert_eq!(outcome.buffer, data);
    assert_eq!(
        outcome.warnings,
        vec![WriteWarning::CountReconciled {
            expected: 4,
            actual: 2
        }]
    );
}

#[test]
fn rules_file_disables_stage() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.toml");
    std::fs::write(&rules, "disabled_stages = [\"reference\"]\n").unwrap();

    let config = HeuristicConfig::from_path(&rules).unwrap();
    let scanner = Scanner::with_config(ScannerConfig::new().rules(config)).unwrap();
    let extraction = scanner.scan(&dialog());
    assert!(texts(&extraction.sections).contains(&"CONFIG.ini".to_string()));
}

#[test]
fn session_saves_backup_and_copy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intro.dlg");
    let data = dialog();
    std::fs::write(&path, &data).unwrap();

    let file = DialogFile::open(&path).unwrap();
    let edited = file.editable_text().replace("Прощай.", "Пока.");

    let backup = file.write_backup().unwrap();
    assert_eq!(backup, dir.path().join("intro.dlg.bak"));
    assert_eq!(std::fs::read(&backup).unwrap(), data);

    let copy = dir.path().join("intro.new.dlg");
    let saved = file.save_with_updated_text(&edited, Some(copy.as_path())).unwrap();
    assert!(saved.unexpected.is_empty());
    assert_eq!(saved.write.changed_sections, vec![3]);

    let comparison = file.compare_with(&copy).unwrap();
    assert!(!comparison.size_differs());
    assert!(!comparison.differences.is_empty());

    let reopened = DialogFile::open(&copy).unwrap();
    assert_eq!(reopened.sections()[3].text, "Пока.");
    assert_eq!(std::fs::read(&path).unwrap(), data);
}

#[test]
fn save_over_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.dlg");
    std::fs::write(&path, dialog()).unwrap();

    let file = DialogFile::open(&path).unwrap();
    let edited = file.editable_text().replace("turnir.", "турнир.");
    let saved = file.save_with_updated_text(&edited, None).unwrap();
    assert_eq!(saved.path, path);

    let reopened = DialogFile::open(&path).unwrap();
    assert_eq!(reopened.sections()[1].text, "Он выиграл турнир.");
    assert_eq!(reopened.sections()[1].trailing_control, "Ђ");
}

#[test]
fn missing_file_is_reported() {
    let err = DialogFile::open("/definitely/not/here.dlg").unwrap_err();
    assert!(matches!(err, Error::FileRead { .. }));
}
