use yaml_core::load;

fn main() {
    let yaml_data = r#"
user:
  name: John Doe
  email: "john.doe@example.com"
  roles: [admin, editor]
"#;

    match load(yaml_data) {
        Ok(document) => {
            print!("Parsed structure:\n{}", document.root);
            match document.to_json() {
                Ok(json_output) => println!("As JSON:\n{json_output}"),
                Err(e) => eprintln!("Failed to serialize: {e}"),
            }
        }
        Err(e) => {
            eprintln!("Failed to parse YAML: {:?}", miette::Report::new(e));
        }
    }
}
