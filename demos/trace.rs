use std::io::Read;

use libc::sbrk;
use segalloc::{Allocator, SbrkHeap};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how the program break moves as the heap grows.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let mut allocator = Allocator::new(SbrkHeap::new());
  allocator.init().expect("heap provider refused the initial extension");

  print_program_break("start");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate 64 bytes and write through the returned pointer.
  // --------------------------------------------------------------------
  let first_block = allocator.malloc(64);
  println!("\n[1] Allocate 64 bytes at {:?}", first_block);
  unsafe {
    (first_block as *mut u64).write(0xDEADBEEF);
    println!("[1] Value written = 0x{:X}", (first_block as *mut u64).read());
  }
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate a second, differently-sized block.
  // --------------------------------------------------------------------
  let second_block = allocator.malloc(12);
  println!("\n[2] Allocate 12 bytes at {:?}", second_block);
  unsafe {
    std::ptr::write_bytes(second_block, 0xAB, 12);
  }
  println!("[2] Initialized second block with 0xAB");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Free the first block, then allocate a smaller one and watch it
  //    get reused instead of extending the heap again.
  // --------------------------------------------------------------------
  allocator.free(first_block);
  println!("\n[3] Freed first_block at {:?}", first_block);

  let third_block = allocator.malloc(8);
  println!(
    "[3] third_block == first_block? {} ({:?} vs {:?})",
    third_block == first_block,
    third_block,
    first_block
  );
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Grow a live block in place via realloc, then watch a realloc that
  //    cannot grow in place fall back to allocate-copy-free.
  // --------------------------------------------------------------------
  let grown = allocator.realloc(second_block, 512);
  println!("\n[4] Grew second_block ({:?}) to 512 bytes -> {:?}", second_block, grown);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Force a heap extension with a large allocation and observe the
  //    program break move.
  // --------------------------------------------------------------------
  print_program_break("before large alloc");
  let big_block = allocator.malloc(64 * 1024);
  println!("\n[5] Allocated a 64 KiB block at {:?}", big_block);
  print_program_break("after large alloc");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) Run the consistency checker over the whole heap.
  // --------------------------------------------------------------------
  allocator.check();
  println!("\n[6] Heap passed consistency check. End of demo.");
}
