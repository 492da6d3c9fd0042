fn main() {
    codarch_cli::run_main();
}
