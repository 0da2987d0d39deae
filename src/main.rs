fn main() {
    voicetrace_lib::run()
}
