//! Tests for key code resolution.

use super::*;

mod key_code {
    use super::*;

    #[test]
    fn none_is_null() {
        let none = KeyCode::none();
        assert!(none.is_none());
        assert_eq!(none.name, NULL_NAME);
        assert_eq!(none.value, NULL_CODE);
    }

    #[test]
    fn non_zero_is_not_none() {
        assert!(!KeyCode::new("VK_A", 0x41).is_none());
    }
}

mod virtual_key_table {
    use super::*;

    #[test]
    fn resolves_digit_names() {
        let table = VirtualKeyTable::new();
        assert_eq!(table.by_name("VK_0").value, 0x30);
        assert_eq!(table.by_name("VK_8").value, 0x38);
    }

    #[test]
    fn resolves_letters_and_function_keys() {
        let table = VirtualKeyTable::new();
        assert_eq!(table.by_name("VK_A").value, 0x41);
        assert_eq!(table.by_name("VK_Z").value, 0x5A);
        assert_eq!(table.by_name("VK_F1").value, 0x70);
        assert_eq!(table.by_name("VK_F24").value, 0x87);
        assert_eq!(table.by_name("VK_NUMPAD9").value, 0x69);
    }

    #[test]
    fn name_lookup_is_case_insensitive_and_trimmed() {
        let table = VirtualKeyTable::new();
        let code = table.by_name("  vk_space ");
        assert_eq!(code, KeyCode::new("VK_SPACE", 0x20));
    }

    #[test]
    fn unknown_name_is_none() {
        let table = VirtualKeyTable::new();
        assert!(table.by_name("VK_DOES_NOT_EXIST").is_none());
        assert!(table.by_name("").is_none());
    }

    #[test]
    fn reverse_lookup_yields_canonical_name() {
        let table = VirtualKeyTable::new();
        assert_eq!(table.by_code(0x38).name, "VK_8");
        assert_eq!(table.by_code(0x1B).name, "VK_ESCAPE");
    }

    #[test]
    fn reverse_lookup_of_unknown_code_is_none() {
        let table = VirtualKeyTable::new();
        let code = table.by_code(0xFFFF);
        assert!(code.is_none());
        assert_eq!(code.name, NULL_NAME);
    }

    #[test]
    fn every_name_round_trips() {
        let table = VirtualKeyTable::new();
        assert!(!table.is_empty());
        for &(name, code) in &[("VK_TAB", 0x09), ("VK_LSHIFT", 0xA0), ("VK_OEM_7", 0xDE)] {
            assert_eq!(table.by_name(name).value, code);
            assert_eq!(table.by_code(code).name, name);
        }
    }

    #[test]
    fn resolver_is_usable_through_reference() {
        fn lookup(resolver: &impl KeyCodeResolver) -> u32 {
            resolver.by_name("VK_F5").value
        }

        let table = VirtualKeyTable::new();
        assert_eq!(lookup(&&table), 0x74);
    }
}
