use falcon_output::selector::{ChannelSelector, ChannelSpec};
use falcon_output::{Error, ErrorKind};

#[test]
fn test_wildcard_and_empty_select_all() {
    assert_eq!(ChannelSpec::parse("*").unwrap(), ChannelSpec::All);
    assert_eq!(ChannelSpec::parse("").unwrap(), ChannelSpec::All);
    assert_eq!(ChannelSpec::parse("   ").unwrap(), ChannelSpec::All);
    assert_eq!(ChannelSpec::parse(",,").unwrap(), ChannelSpec::All);
}

#[test]
fn test_order_and_repeats_are_kept() {
    let spec = ChannelSpec::parse("3,1, 3 ,0").unwrap();
    assert_eq!(spec, ChannelSpec::Select(vec![3, 1, 3, 0]));
    assert_eq!(spec.resolve(4).unwrap(), vec![3, 1, 3, 0]);
}

#[test]
fn test_empty_items_are_skipped() {
    let spec = ChannelSpec::parse("1,,2,").unwrap();
    assert_eq!(spec.resolve(3).unwrap(), vec![1, 2]);
}

#[test]
fn test_resolve_length_matches_tokens() {
    for (text, tokens) in [("0", 1), ("0,1", 2), ("2,2,2", 3), ("5,4,3,2,1,0", 6)] {
        let spec = ChannelSpec::parse(text).unwrap();
        assert_eq!(spec.resolve(8).unwrap().len(), tokens, "spec {:?}", text);
    }
}

#[test]
fn test_all_resolves_to_block_channels() {
    assert_eq!(ChannelSpec::All.resolve(4).unwrap(), vec![0, 1, 2, 3]);
    assert!(ChannelSpec::All.resolve(0).unwrap().is_empty());
}

#[test]
fn test_out_of_range_checked_per_block() {
    let spec = ChannelSpec::parse("5").unwrap();
    assert_eq!(spec.resolve(8).unwrap(), vec![5]);

    let err = spec.resolve(4).unwrap_err();
    assert!(matches!(err, Error::ChannelOutOfRange { channel: 5, available: 4 }));
    assert_eq!(err.kind(), ErrorKind::ChannelOutOfRange);
}

#[test]
fn test_non_integer_rejected() {
    for text in ["a", "1,b", "1.5", "-1", "0x2"] {
        let err = ChannelSpec::parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config, "spec {:?}", text);
    }
}

#[test]
fn test_selector_keeps_previous_spec_on_error() {
    let mut selector = ChannelSelector::new("1,3").unwrap();
    assert!(selector.set_spec("1,x").is_err());
    assert_eq!(selector.text(), "1,3");
    assert_eq!(selector.spec(), &ChannelSpec::Select(vec![1, 3]));

    selector.set_spec("*").unwrap();
    assert_eq!(selector.spec(), &ChannelSpec::All);
}

#[test]
fn test_default_selector_is_wildcard() {
    let selector = ChannelSelector::default();
    assert_eq!(selector.text(), "*");

    let mut out = Vec::new();
    selector.resolve_into(3, &mut out).unwrap();
    assert_eq!(out, vec![0, 1, 2]);
}
