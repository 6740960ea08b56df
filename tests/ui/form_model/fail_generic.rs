#[derive(Clone, signin_card::form::FormModel)]
struct DraftForm<T> {
    value: T,
}

fn main() {
    let form = DraftForm { value: 1u8 };
    let _ = form.value;
}
