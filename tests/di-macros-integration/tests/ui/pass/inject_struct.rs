use di_abstractions::{Injectable, Key, ParameterBinding};
use di_macros::inject;
use std::sync::Arc;

struct ApiKey(String);

#[inject]
struct UserController {
    api_key: Arc<ApiKey>,
    #[inject(default)]
    retries: u32,
    label: String,
}

fn main() {
    let signature = UserController::signature();
    let parameters = signature.parameters();

    assert_eq!(signature.owner(), "UserController");
    assert_eq!(
        parameters[0].binding,
        ParameterBinding::Key(*Key::<ApiKey>::of().binding())
    );
    assert_eq!(parameters[1].binding, ParameterBinding::Default);
    assert_eq!(parameters[2].binding, ParameterBinding::Unbound);
}
