use di_macros::injectable;

#[injectable]
fn api_key() -> String {
    String::new()
}

fn main() {}
