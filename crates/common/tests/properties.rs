//! Property tests for the form engine

use std::sync::Arc;

use proptest::prelude::*;

use formgate_common::layout::FieldSpec;
use formgate_common::{
    registration_form_2, registration_form_3, CountryCityCatalog, Form, FormConfig, FormEvent,
    FormLayout, LocationState,
};

const MANDATORY: [&str; 5] = ["username", "email", "firstName", "lastName", "phoneNumber"];

fn filled_form_2() -> Form {
    let mut form = Form::new(Arc::new(
        registration_form_2(&FormConfig::default()).unwrap(),
    ));
    for (field, value) in MANDATORY.iter().zip([
        "Test1",
        "test@example.com",
        "Kaie",
        "Kukk",
        "55512345",
    ]) {
        form.fill(field, value).unwrap();
    }
    form
}

fn country_key() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["spain", "estonia", "austria"])
}

proptest! {
    #[test]
    fn empty_mandatory_field_closes_gate(
        index in 0..MANDATORY.len(),
        blank in "[ \t]{0,3}",
    ) {
        let mut form = filled_form_2();
        prop_assert!(form.status().submit_enabled);

        form.fill(MANDATORY[index], &blank).unwrap();
        let status = form.status();
        prop_assert!(!status.submit_enabled);
        prop_assert!(status.input_error_visible);
        prop_assert!(status.field(MANDATORY[index]).unwrap().highlighted);
    }

    #[test]
    fn password_pair_gates_submit(
        password in "[A-Za-z0-9]{0,12}",
        confirmation in "[A-Za-z0-9]{0,12}",
        fill_mandatory in any::<bool>(),
    ) {
        let mut form = if fill_mandatory {
            filled_form_2()
        } else {
            Form::new(Arc::new(registration_form_2(&FormConfig::default()).unwrap()))
        };
        form.fill("password", &password).unwrap();
        form.fill("confirm", &confirmation).unwrap();
        form.blur().unwrap();

        let status = form.status();
        prop_assert_eq!(status.submit_enabled, password == confirmation && fill_mandatory);
        prop_assert_eq!(status.password_mismatch, password != confirmation);
        prop_assert_eq!(status.password_error_visible, password != confirmation);
        prop_assert_eq!(status.input_error_visible, !fill_mandatory);
    }

    #[test]
    fn invalid_optional_email_never_gates_submit(
        name in "[A-Za-z]{1,10}",
        backup in "[a-z@. ]{0,16}",
    ) {
        let layout = FormLayout::new("contact", "Contact")
            .with_field(FieldSpec::text("name", "Name").mandatory())
            .with_field(FieldSpec::email("backup", "Backup email"));
        let mut form = Form::new(Arc::new(layout));
        form.fill("name", &name).unwrap();
        form.fill("backup", &backup).unwrap();
        form.submit().unwrap();

        let status = form.status();
        prop_assert!(status.submit_enabled);
        prop_assert!(!status.input_error_visible);
        prop_assert!(!status.field("backup").unwrap().highlighted);
    }

    #[test]
    fn switching_country_clears_city(
        first in country_key(),
        second in country_key(),
        city_index in 0usize..3,
    ) {
        let catalog = CountryCityCatalog::default();
        let city = catalog.country(first).unwrap().cities[city_index].clone();

        let state = LocationState::default()
            .select_country(&catalog, first)
            .unwrap()
            .select_city(&catalog, &city)
            .unwrap()
            .select_country(&catalog, second)
            .unwrap();

        prop_assert_eq!(state.city(), None);

        let offered: Vec<String> = state
            .city_options(&catalog)
            .into_iter()
            .map(|o| o.label)
            .collect();
        let mut expected = vec![String::new()];
        expected.extend(catalog.country(second).unwrap().cities.iter().cloned());
        prop_assert_eq!(offered, expected);
    }

    #[test]
    fn rejected_city_keeps_state(country in country_key(), other in country_key(), city_index in 0usize..3) {
        prop_assume!(country != other);
        let layout = Arc::new(registration_form_3(&FormConfig::default()).unwrap());
        let catalog = CountryCityCatalog::default();
        let foreign = catalog.country(other).unwrap().cities[city_index].clone();

        let mut form = Form::new(layout);
        form.select_country(country).unwrap();
        let before = form.state().clone();

        let result = form.dispatch(FormEvent::SelectCity { city: foreign });
        prop_assert!(result.is_err());
        prop_assert_eq!(form.state(), &before);
    }
}
