////////////////////////////////////////////////////////////////////////////////
// This file is part of "Altair", an embeddable scripting programming         //
// language platform.                                                         //
//                                                                            //
// This work is free software, distributed under the terms of the MIT         //
// license, as published in the LICENSE file of the source code distribution. //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
////////////////////////////////////////////////////////////////////////////////

macro_rules! system_panic {
    ($($arg:tt)*) => {{
        panic!(
            "{}\n\nThis is a bug in Altair. If you encounter this message, \
            please report it to the Altair issue tracker.",
            ::std::format_args!($($arg)*),
        );
    }};
}

pub(crate) use system_panic;
