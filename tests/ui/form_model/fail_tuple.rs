#[derive(Clone, signin_card::form::FormModel)]
struct Credentials(String, String);

fn main() {
    let credentials = Credentials(String::new(), String::new());
    let _ = (&credentials.0, &credentials.1);
}
