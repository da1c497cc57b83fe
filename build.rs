fn main() {
    // Only the board binary links against ESP-IDF; host builds of the library skip this.
    #[cfg(feature = "esp32")]
    embuild::espidf::sysenv::output();
}
