//! Tests for change detection and write-back.

use std::collections::HashMap;
use std::path::PathBuf;

use super::test_fixtures::ConfigFile;
use super::writer::write_atomic;
use super::{ConfigStore, Live, SaveSummary, StoreError, Toggle};

const SAMPLE: &str = "\
// Display settings
Character Stats: VK_8 // hotkey
Show Ethereal:   True, VK_E
Poll Rate: 0x1F   // in ticks

Verbose: false
Title: Main
";

mod unchanged {
    use super::*;

    #[test]
    fn save_without_changes_is_a_noop() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let verbose = Live::new(false);
        let rate = Live::new(0_u32);
        store.read_bool("Verbose", &verbose).unwrap();
        store.read_uint("Poll Rate", &rate).unwrap();

        let summary = store.save().unwrap();

        assert!(summary.is_noop());
        assert_eq!(file.read(), SAMPLE);
    }

    #[test]
    fn equal_numbers_in_other_base_are_not_changes() {
        let file = ConfigFile::new("Value: 0x5\n");
        let mut store = file.open();
        let live = Live::new(0_u32);
        store.read_uint("Value", &live).unwrap();

        live.set(5);

        assert!(store.save().unwrap().is_noop());
    }

    #[test]
    fn seeded_defaults_are_not_written() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let live = Live::new(3_u32);
        store.read_uint("Absent", &live).unwrap();

        assert!(store.save().unwrap().is_noop());
        assert_eq!(file.read(), SAMPLE);
    }

    #[test]
    fn dropped_variables_are_ignored() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let verbose = Live::new(false);
        store.read_bool("Verbose", &verbose).unwrap();
        verbose.set(true);
        drop(verbose);

        assert!(store.save().unwrap().is_noop());
        assert_eq!(file.read(), SAMPLE);
    }

    #[test]
    fn unknown_key_name_is_left_alone() {
        let file = ConfigFile::new("Character Stats: VK_BOGUS // hk\n");
        let mut store = file.open();
        let live = Live::new(0_u32);
        store.read_key("Character Stats", "VK_9", &live).unwrap();

        assert!(store.save().unwrap().is_noop());
        assert_eq!(file.read(), "Character Stats: VK_BOGUS // hk\n");
    }
}

mod selective_patch {
    use super::*;

    #[test]
    fn only_the_changed_value_is_rewritten() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let verbose = Live::new(false);
        let title = Live::new(String::new());
        store.read_bool("Verbose", &verbose).unwrap();
        store.read_string("Title", &title).unwrap();

        verbose.set(true);
        let summary = store.save().unwrap();

        assert_eq!(
            summary,
            SaveSummary {
                updated: 1,
                appended: 0,
                purged: 0
            }
        );
        assert_eq!(file.read(), SAMPLE.replace("Verbose: false", "Verbose: True"));
        assert_eq!(store.entry("Verbose").unwrap().value(), "True");
    }

    #[test]
    fn comments_and_spacing_survive() {
        let file = ConfigFile::new("Name:\t old value   // keep me\n");
        let mut store = file.open();
        let live = Live::new(String::new());
        store.read_string("Name", &live).unwrap();

        live.set("new".to_string());
        store.save().unwrap();

        assert_eq!(file.read(), "Name:\t new   // keep me\n");
    }

    #[test]
    fn hex_values_stay_hex() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let rate = Live::new(0_u32);
        store.read_uint("Poll Rate", &rate).unwrap();

        rate.set(32);
        store.save().unwrap();

        assert!(file.read().contains("Poll Rate: 0x20   // in ticks\n"));
    }

    #[test]
    fn key_and_toggle_are_written_by_name() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let stats = Live::new(0_u32);
        let ethereal = Live::new(Toggle::default());
        store.read_key("Character Stats", "VK_8", &stats).unwrap();
        store
            .read_toggle("Show Ethereal", "VK_E", true, &ethereal)
            .unwrap();

        stats.set(0x70);
        ethereal.set(Toggle::new(0x46, false));
        store.save().unwrap();

        let content = file.read();
        assert!(content.contains("Character Stats: VK_F1 // hotkey\n"));
        assert!(content.contains("Show Ethereal:   False, VK_F\n"));
    }

    #[test]
    fn writes_back_the_same_values_after_reopen() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let title = Live::new(String::new());
        store.read_string("Title", &title).unwrap();
        title.set("Renamed".to_string());
        store.save().unwrap();

        let mut reopened = file.open();
        let again = Live::new(String::new());
        assert_eq!(reopened.read_string("Title", &again).unwrap(), "Renamed");
        assert!(reopened.save().unwrap().is_noop());
    }

    #[test]
    fn crlf_files_keep_crlf() {
        let file = ConfigFile::new("A: 1\r\nB: 2\r\n");
        let mut store = file.open();
        let live = Live::new(0_u32);
        store.read_uint("B", &live).unwrap();

        live.set(3);
        store.save().unwrap();

        assert_eq!(file.read(), "A: 1\r\nB: 3\r\n");
    }

    #[test]
    fn only_first_duplicate_line_is_patched() {
        let file = ConfigFile::new("Key: 1\nKey: 2\n");
        let mut store = file.open();
        let live = Live::new(0_u32);
        store.read_uint("Key", &live).unwrap();

        live.set(9);
        store.save().unwrap();

        assert_eq!(file.read(), "Key: 9\nKey: 2\n");
    }

    #[test]
    fn invalid_utf8_in_other_lines_is_kept() {
        let file = ConfigFile::new(b"Name: caf\xe9 // latin-1\nVerbose: false\n");
        let mut store = file.open();
        let verbose = Live::new(false);
        store.read_bool("Verbose", &verbose).unwrap();

        verbose.set(true);
        store.save().unwrap();

        assert_eq!(file.read_bytes(), b"Name: caf\xe9 // latin-1\nVerbose: True\n");
    }

    #[test]
    fn empty_string_removes_the_line() {
        let file = ConfigFile::new("Title: Main // t\nVerbose: false\n");
        let mut store = file.open();
        let title = Live::new(String::new());
        store.read_string("Title", &title).unwrap();

        title.set(String::new());
        let summary = store.save().unwrap();

        assert_eq!(summary.purged, 1);
        assert_eq!(file.read(), "Verbose: false\n");
        assert_eq!(store.entry("Title").unwrap().value(), "");
        assert!(store.save().unwrap().is_noop());
    }
}

mod append {
    use super::*;

    #[test]
    fn changed_new_key_is_appended_before_final_newline() {
        let file = ConfigFile::new("A: 1\n");
        let mut store = file.open();
        let live = Live::new(false);
        store.read_bool("Fresh", &live).unwrap();

        live.set(true);
        let summary = store.save().unwrap();

        assert_eq!(summary.appended, 1);
        assert_eq!(file.read(), "A: 1\nFresh: True\n");
        assert_eq!(store.entry("Fresh").unwrap().value(), "True");
    }

    #[test]
    fn appends_after_last_line_without_terminator() {
        let file = ConfigFile::new("A: 1");
        let mut store = file.open();
        let live = Live::new(String::new());
        store.read_string("B", &live).unwrap();

        live.set("two".to_string());
        store.save().unwrap();

        let sep = if cfg!(windows) { "\r\n" } else { "\n" };
        assert_eq!(file.read(), format!("A: 1{sep}B: two"));
    }

    #[test]
    fn appended_lines_are_sorted_by_key() {
        let file = ConfigFile::new("");
        let mut store = file.open();
        let b = Live::new(0_u32);
        let a = Live::new(0_u32);
        store.read_uint("B", &b).unwrap();
        store.read_uint("A", &a).unwrap();

        b.set(2);
        a.set(1);
        store.save().unwrap();

        let sep = if cfg!(windows) { "\r\n" } else { "\n" };
        assert_eq!(file.read(), format!("A: 1{sep}B: 2"));
    }

    #[test]
    fn second_save_updates_appended_line_in_place() {
        let file = ConfigFile::new("A: 1\n");
        let mut store = file.open();
        let live = Live::new(0_u32);
        store.read_uint("Fresh", &live).unwrap();

        live.set(1);
        store.save().unwrap();
        live.set(2);
        let summary = store.save().unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(file.read(), "A: 1\nFresh: 2\n");
    }
}

mod arrays {
    use super::*;

    #[test]
    fn shrunk_array_purges_lines() {
        let file = ConfigFile::new("// list\nBase[0]: A\nBase[1]: B // second\nBase[2]: C\nEnd: 1\n");
        let mut store = file.open();
        let live = Live::new(Vec::new());
        store.read_array("Base", &live).unwrap();

        live.update(|items| items.truncate(1));
        let summary = store.save().unwrap();

        assert_eq!(summary.purged, 2);
        assert_eq!(file.read(), "// list\nBase[0]: A\nEnd: 1\n");
        assert_eq!(store.entry("Base[1]").unwrap().value(), "");
    }

    #[test]
    fn purge_is_not_repeated() {
        let file = ConfigFile::new("Base[0]: A\nBase[1]: B\n");
        let mut store = file.open();
        let live = Live::new(Vec::new());
        store.read_array("Base", &live).unwrap();

        live.update(Vec::clear);
        store.save().unwrap();
        let content = file.read();

        assert!(store.save().unwrap().is_noop());
        assert_eq!(file.read(), content);
    }

    #[test]
    fn changed_element_is_patched() {
        let file = ConfigFile::new("Base[0]: A\nBase[1]: B\n");
        let mut store = file.open();
        let live = Live::new(Vec::new());
        store.read_array("Base", &live).unwrap();

        live.update(|items| items[1] = "Z".to_string());
        store.save().unwrap();

        assert_eq!(file.read(), "Base[0]: A\nBase[1]: Z\n");
    }

    #[test]
    fn emptied_element_is_purged() {
        let file = ConfigFile::new("Base[0]: A\nBase[1]: B\nBase[2]: C\n");
        let mut store = file.open();
        let live = Live::new(Vec::new());
        store.read_array("Base", &live).unwrap();

        live.update(|items| items[1].clear());
        let summary = store.save().unwrap();

        assert_eq!(summary.purged, 1);
        assert_eq!(file.read(), "Base[0]: A\nBase[2]: C\n");
        assert!(store.save().unwrap().is_noop());
    }

    #[test]
    fn grown_array_appends_elements() {
        let file = ConfigFile::new("Base[0]: A\n");
        let mut store = file.open();
        let live = Live::new(Vec::new());
        store.read_array("Base", &live).unwrap();

        live.update(|items| items.push("B".to_string()));
        let summary = store.save().unwrap();

        assert_eq!(summary.appended, 1);
        assert_eq!(file.read(), "Base[0]: A\nBase[1]: B\n");
        assert!(store.entry("Base[1]").unwrap().is_bound());
    }

    #[test]
    fn grown_array_reuses_hidden_lines() {
        let file = ConfigFile::new("Base[0]: A\nBase[2]: old\n");
        let mut store = file.open();
        let live = Live::new(Vec::new());
        store.read_array("Base", &live).unwrap();

        live.update(|items| items.extend(["B".to_string(), "C".to_string()]));
        store.save().unwrap();

        assert_eq!(file.read(), "Base[0]: A\nBase[2]: C\nBase[1]: B\n");
    }
}

mod maps {
    use super::*;

    #[test]
    fn boolean_map_change_keeps_original_label_case() {
        let file = ConfigFile::new("Flag[ON]: true\n");
        let mut store = file.open();
        let live = Live::new(HashMap::new());
        store.read_assoc_bool("Flag", &live).unwrap();

        live.update(|map| map.insert("on".to_string(), false));
        store.save().unwrap();

        assert_eq!(file.read(), "Flag[ON]: False\n");
    }

    #[test]
    fn removed_label_is_purged() {
        let file = ConfigFile::new("Name[a]: 1\nName[b]: 2\n");
        let mut store = file.open();
        let live = Live::new(HashMap::new());
        store.read_assoc_string("Name", &live).unwrap();

        live.update(|map| map.remove("a"));
        store.save().unwrap();

        assert_eq!(file.read(), "Name[b]: 2\n");
    }

    #[test]
    fn added_label_is_appended() {
        let file = ConfigFile::new("Color[a]: 0x1\n");
        let mut store = file.open();
        let live = Live::new(HashMap::new());
        store.read_assoc_int("Color", &live).unwrap();

        live.update(|map| {
            map.insert("a".to_string(), 2);
            map.insert("b".to_string(), 7);
        });
        store.save().unwrap();

        assert_eq!(file.read(), "Color[a]: 0x2\nColor[b]: 7\n");
    }
}

mod failures {
    use super::*;

    #[test]
    fn missing_file_fails_without_writing() {
        let file = ConfigFile::new("Key: 1\n");
        let mut store = file.open();
        let live = Live::new(0_u32);
        store.read_uint("Key", &live).unwrap();
        std::fs::remove_file(file.path()).unwrap();

        live.set(2);
        let result = store.save();

        assert!(matches!(result, Err(StoreError::Read { .. })));
        assert!(!file.path().exists());
    }

    #[test]
    fn store_never_opened_cannot_save() {
        let file = ConfigFile::missing();
        let mut store = ConfigStore::new(file.path(), crate::keys::VirtualKeyTable::new());

        assert!(store.save().unwrap_err().is_io());
    }

    #[test]
    fn failed_write_keeps_the_change_pending() {
        let file = ConfigFile::new(SAMPLE);
        let mut store = file.open();
        let verbose = Live::new(false);
        store.read_bool("Verbose", &verbose).unwrap();
        let blocker = PathBuf::from(format!("{}.tmp", file.path().display()));
        std::fs::create_dir(&blocker).unwrap();

        verbose.set(true);
        assert!(matches!(store.save(), Err(StoreError::Write { .. })));
        assert_eq!(file.read(), SAMPLE);
        assert_eq!(store.entry("Verbose").unwrap().value(), "false");

        std::fs::remove_dir(&blocker).unwrap();
        let summary = store.save().unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(file.read(), SAMPLE.replace("Verbose: false", "Verbose: True"));
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let file = ConfigFile::new("");
        let target = file.path().with_file_name("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("inside"), "x").unwrap();

        let result = write_atomic(&target, b"Key: 1\n");

        assert!(matches!(result, Err(StoreError::Write { .. })));
        assert!(!PathBuf::from(format!("{}.tmp", target.display())).exists());
        assert!(target.join("inside").exists());
    }
}
