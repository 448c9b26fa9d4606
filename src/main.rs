fn main() {
    dataset_prep::cli::run();
}
