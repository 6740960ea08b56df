#[derive(Clone, signin_card::form::FormModel)]
enum SignInStep {
    Email,
    Password,
}

fn main() {
    let _ = [SignInStep::Email, SignInStep::Password];
}
