fn main() -> Result<(), Box<dyn std::error::Error>> {
    persona_chat::cli::main()
}
