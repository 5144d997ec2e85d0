//! Integration tests against the devices of the machine running the tests

#![cfg(windows)]

use windevice::{ClassDevsFlags, DeviceClass, Query, Selector, StringMatcher};

#[test]
fn it_enumerates_present_devices() {
    let query = Query::new().with_flags(ClassDevsFlags::PRESENT);

    let mut ids = vec![];
    query
        .each(|device| {
            ids.push(device.instance_id()?);
            Ok(())
        })
        .expect("Failed to enumerate devices");

    assert!(!ids.is_empty(), "Should find at least one present device");
    assert_eq!(query.count().unwrap(), ids.len());
}

#[test]
fn it_resolves_a_builtin_class() {
    let api = windevice::setupapi::SetupApi::load().unwrap();
    let class = DeviceClass::from_name(api, "System", None).unwrap();

    assert!(!class.guids.is_empty());

    let query = Query::new()
        .with_class(class.guids[0])
        .with_flags(ClassDevsFlags::PRESENT);
    query
        .each(|device| {
            assert!(StringMatcher::equal_fold("system").matches(&device.class()?));
            Ok(())
        })
        .unwrap();
}

#[test]
fn it_selects_by_absent_property() {
    let everything = Query::new().with_flags(ClassDevsFlags::PRESENT);
    let selected = everything
        .clone()
        .with_selector(Selector::any(vec![
            Selector::friendly_name(StringMatcher::Always),
            Selector::description(StringMatcher::Always),
        ]));

    assert_eq!(everything.count().unwrap(), selected.count().unwrap());
}

#[test]
fn it_reads_the_installed_driver() {
    let query = Query::new()
        .with_flags(ClassDevsFlags::PRESENT)
        .with_selector(Selector::class(StringMatcher::equal_fold("system")));

    let mut drivers = 0;
    query
        .each(|device| {
            drivers += device.installed_driver().count()?;
            Ok(())
        })
        .unwrap();

    assert!(drivers > 0);
}
