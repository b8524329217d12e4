use di_macros::inject;

#[inject]
fn greeting() -> impl std::fmt::Display {
    "hello"
}

fn main() {}
