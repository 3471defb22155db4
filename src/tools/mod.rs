pub mod addable_blocks_tool;
