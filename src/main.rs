#[cfg(not(feature = "jemalloc"))]
#[global_allocator]
static ALLOC: stratbench::probe::TrackingAllocator =
    stratbench::probe::TrackingAllocator::new(std::alloc::System);

#[cfg(feature = "jemalloc")]
#[global_allocator]
static ALLOC: stratbench::probe::TrackingAllocator<jemallocator::Jemalloc> =
    stratbench::probe::TrackingAllocator::new(jemallocator::Jemalloc);

use stratbench::error::AppResult;

fn main() -> AppResult<()> {
    stratbench::entry::run()
}
