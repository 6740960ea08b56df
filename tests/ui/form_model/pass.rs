use signin_card::form::{FieldKey, FieldLens, FormModel, Schema, email};

#[derive(Clone, signin_card::form::FormModel)]
struct ContactForm {
    email: String,
    display_name: String,
}

fn main() {
    let fields = ContactForm::fields();
    let lens = fields.email();
    let mut model = ContactForm {
        email: "a@b.com".to_string(),
        display_name: String::new(),
    };
    lens.set(&mut model, "user@example.com".to_string());
    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.get(&model), "user@example.com");
    assert_eq!(
        ContactForm::field_keys(),
        &[FieldKey::new("email"), FieldKey::new("display_name")]
    );

    let _: ContactFormDisplayNameLens = fields.display_name();
    let schema = Schema::new().rule(fields.email(), email("invalid"));
    assert!(schema.validate(&model).is_empty());
}
