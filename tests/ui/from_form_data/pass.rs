use formsync::form::{FormData, FormValue, FromFormData};

#[derive(Debug, formsync::form::FromFormData)]
struct Signup {
    email: String,
    #[form(rename = "accept-terms")]
    accepted: bool,
    nickname: Option<String>,
}

fn main() {
    let mut data = FormData::new();
    data.insert("email", FormValue::text("ada@example.com"));
    data.insert("accept-terms", FormValue::Bool(true));
    data.insert("nickname", FormValue::text(""));

    let signup = Signup::from_form_data(&data).expect("complete form data");
    assert_eq!(signup.email, "ada@example.com");
    assert!(signup.accepted);
    assert_eq!(signup.nickname, None);

    let missing = Signup::from_form_data(&FormData::new());
    assert!(missing.is_err());
}
