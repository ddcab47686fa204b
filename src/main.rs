fn main() {
  ubrc20::main()
}
